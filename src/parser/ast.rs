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

//! AST for the ANALYZE command

use std::fmt;

/// What an `ANALYZE` command names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyzeTarget {
    /// `ANALYZE`
    All,
    /// `ANALYZE name`, either a database or a table in the default database
    Name(String),
    /// `ANALYZE db.table`
    Qualified { database: String, table: String },
}

/// A parsed `ANALYZE` statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeStatement {
    pub target: AnalyzeTarget,
}

impl AnalyzeStatement {
    pub fn new(target: AnalyzeTarget) -> Self {
        Self { target }
    }

    pub fn all() -> Self {
        Self::new(AnalyzeTarget::All)
    }
}

fn write_ident(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    let bare = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '$');
    if bare {
        write!(f, "{}", name)
    } else {
        write!(f, "\"{}\"", name.replace('"', "\"\""))
    }
}

impl fmt::Display for AnalyzeStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ANALYZE")?;
        match &self.target {
            AnalyzeTarget::All => Ok(()),
            AnalyzeTarget::Name(name) => {
                write!(f, " ")?;
                write_ident(f, name)
            }
            AnalyzeTarget::Qualified { database, table } => {
                write!(f, " ")?;
                write_ident(f, database)?;
                write!(f, ".")?;
                write_ident(f, table)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(AnalyzeStatement::all().to_string(), "ANALYZE");
        assert_eq!(
            AnalyzeStatement::new(AnalyzeTarget::Name("t1".into())).to_string(),
            "ANALYZE t1"
        );
        assert_eq!(
            AnalyzeStatement::new(AnalyzeTarget::Qualified {
                database: "aux".into(),
                table: "my \"t\"".into(),
            })
            .to_string(),
            "ANALYZE aux.\"my \"\"t\"\"\""
        );
    }
}
