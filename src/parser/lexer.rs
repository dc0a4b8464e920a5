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

//! SQL Lexer (Tokenizer)
//!
//! Splits an `ANALYZE` command into identifiers and punctuation. Quoted
//! identifiers accept `"..."`, `` `...` `` and `[...]` forms; a doubled
//! closing quote inside `"..."` or `` `...` `` stands for itself.

use crate::core::{Error, Result};

/// A single lexical token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Bare identifier or keyword, as written
    Word(String),
    /// Quoted identifier with the quotes removed
    Quoted(String),
    Dot,
    Semicolon,
    Eof,
}

/// SQL Lexer for tokenizing input
pub struct Lexer<'a> {
    input: &'a str,
    /// Byte offset of the next unread character
    position: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input
    pub fn new(input: &'a str) -> Self {
        Self { input, position: 0 }
    }

    /// Byte offset of the next unread character
    pub fn position(&self) -> usize {
        self.position
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn read_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.position += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(ch) if ch.is_whitespace()) {
            self.read_char();
        }
    }

    /// Read the next token
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        let start = self.position;
        let Some(ch) = self.read_char() else {
            return Ok(Token::Eof);
        };

        match ch {
            '.' => Ok(Token::Dot),
            ';' => Ok(Token::Semicolon),
            '"' => self.read_quoted('"', start),
            '`' => self.read_quoted('`', start),
            '[' => self.read_quoted(']', start),
            c if is_identifier_start(c) => {
                while matches!(self.peek_char(), Some(c) if is_identifier_char(c)) {
                    self.read_char();
                }
                Ok(Token::Word(self.input[start..self.position].to_string()))
            }
            other => Err(Error::parse(format!(
                "unexpected character '{}' at offset {}",
                other, start
            ))),
        }
    }

    fn read_quoted(&mut self, close: char, start: usize) -> Result<Token> {
        let mut text = String::new();
        loop {
            match self.read_char() {
                None => {
                    return Err(Error::parse(format!(
                        "unterminated quoted identifier at offset {}",
                        start
                    )))
                }
                Some(c) if c == close => {
                    // Brackets have no escape form
                    if close != ']' && self.peek_char() == Some(close) {
                        self.read_char();
                        text.push(close);
                    } else {
                        break;
                    }
                }
                Some(c) => text.push(c),
            }
        }
        if text.is_empty() {
            return Err(Error::parse(format!(
                "empty quoted identifier at offset {}",
                start
            )));
        }
        Ok(Token::Quoted(text))
    }
}

fn is_identifier_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().unwrap();
            if tok == Token::Eof {
                break;
            }
            out.push(tok);
        }
        out
    }

    #[test]
    fn test_words_and_punctuation() {
        assert_eq!(
            tokens("ANALYZE main.t1;"),
            vec![
                Token::Word("ANALYZE".into()),
                Token::Word("main".into()),
                Token::Dot,
                Token::Word("t1".into()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_quoted_forms() {
        assert_eq!(
            tokens(r#""my table" `a``b` [x y]"#),
            vec![
                Token::Quoted("my table".into()),
                Token::Quoted("a`b".into()),
                Token::Quoted("x y".into()),
            ]
        );
    }

    #[test]
    fn test_errors() {
        assert!(Lexer::new("\"open").next_token().is_err());
        assert!(Lexer::new("\"\"").next_token().is_err());
        assert!(Lexer::new("#").next_token().is_err());
    }
}
