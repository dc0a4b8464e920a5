// Copyright 2025 Stoolap Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Parser for the ANALYZE command
//!
//! This module provides:
//! - [`Lexer`]: Tokenizes the command text
//! - [`ast`]: The [`AnalyzeStatement`] node
//! - [`parse_analyze`]: Recognizes the three command forms
//! - [`parse_qualified_name`]: Splits `db.table` names for the seeding helpers
//!
//! # Example
//!
//! ```ignore
//! use statcomp::parser::{parse_analyze, AnalyzeTarget};
//!
//! let stmt = parse_analyze("ANALYZE main.orders").unwrap();
//! assert!(matches!(stmt.target, AnalyzeTarget::Qualified { .. }));
//! ```

pub mod ast;
pub mod lexer;

pub use ast::{AnalyzeStatement, AnalyzeTarget};
pub use lexer::{Lexer, Token};

use crate::core::{Error, Result};

/// Parse `ANALYZE`, `ANALYZE name` or `ANALYZE db.name`, with an optional
/// trailing semicolon.
pub fn parse_analyze(sql: &str) -> Result<AnalyzeStatement> {
    let mut lexer = Lexer::new(sql);

    match lexer.next_token()? {
        Token::Word(word) if word.eq_ignore_ascii_case("ANALYZE") => {}
        other => {
            return Err(Error::parse(format!(
                "expected ANALYZE, found {:?}",
                other
            )))
        }
    }

    let target = match lexer.next_token()? {
        Token::Eof | Token::Semicolon => {
            expect_end(&mut lexer)?;
            return Ok(AnalyzeStatement::all());
        }
        Token::Word(first) | Token::Quoted(first) => match lexer.next_token()? {
            Token::Eof => return Ok(AnalyzeStatement::new(AnalyzeTarget::Name(first))),
            Token::Semicolon => {
                expect_end(&mut lexer)?;
                return Ok(AnalyzeStatement::new(AnalyzeTarget::Name(first)));
            }
            Token::Dot => {
                let table = expect_identifier(&mut lexer)?;
                AnalyzeTarget::Qualified {
                    database: first,
                    table,
                }
            }
            other => {
                return Err(Error::parse(format!(
                    "unexpected {:?} after '{}'",
                    other, first
                )))
            }
        },
        Token::Dot => return Err(Error::parse("expected a name before '.'")),
    };

    match lexer.next_token()? {
        Token::Eof => {}
        Token::Semicolon => expect_end(&mut lexer)?,
        other => {
            return Err(Error::parse(format!(
                "unexpected {:?} at offset {}",
                other,
                lexer.position()
            )))
        }
    }
    Ok(AnalyzeStatement::new(target))
}

/// Parse a possibly qualified name, `table` or `db.table`
///
/// Either part may be quoted, so `aux."a.b"` names table `a.b` in `aux`.
pub fn parse_qualified_name(text: &str) -> Result<(Option<String>, String)> {
    let mut lexer = Lexer::new(text);
    let first = expect_identifier(&mut lexer)?;
    match lexer.next_token()? {
        Token::Eof => Ok((None, first)),
        Token::Dot => {
            let table = expect_identifier(&mut lexer)?;
            expect_end(&mut lexer)?;
            Ok((Some(first), table))
        }
        other => Err(Error::parse(format!(
            "unexpected {:?} after '{}'",
            other, first
        ))),
    }
}

fn expect_identifier(lexer: &mut Lexer<'_>) -> Result<String> {
    match lexer.next_token()? {
        Token::Word(name) | Token::Quoted(name) => Ok(name),
        other => Err(Error::parse(format!(
            "expected a table name, found {:?}",
            other
        ))),
    }
}

fn expect_end(lexer: &mut Lexer<'_>) -> Result<()> {
    match lexer.next_token()? {
        Token::Eof => Ok(()),
        other => Err(Error::parse(format!(
            "unexpected {:?} after end of statement",
            other
        ))),
    }
}
