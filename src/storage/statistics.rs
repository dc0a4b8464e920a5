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

//! Statistics catalog table contract
//!
//! ANALYZE writes one row per analyzed index into the catalog table:
//!
//! | column | content |
//! |--------|---------|
//! | `tbl`  | table name |
//! | `idx`  | index name |
//! | `stat` | `N` unsigned decimal integers separated by single spaces |
//!
//! Entry `i` of `stat` is the average number of rows matching one distinct
//! value of the first `i` index columns. The planner reads these rows back
//! with [`StatRecord::estimates`].

use crate::core::{Error, Result, Row};

/// Default name of the statistics catalog table
pub const DEFAULT_STAT_TABLE: &str = "sqlite_stat1";

/// Columns of the statistics catalog table
pub const STAT_COLUMNS: [&str; 3] = ["tbl", "idx", "stat"];

/// Position of the `tbl` column, used for table-scoped deletes
pub const STAT_TABLE_COLUMN: usize = 0;

/// One row of the statistics catalog table
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatRecord {
    /// Name of the analyzed table
    pub table: String,
    /// Name of the analyzed index
    pub index: String,
    /// Space separated selectivity estimates
    pub stat: String,
}

impl StatRecord {
    /// Create a record
    pub fn new(table: impl Into<String>, index: impl Into<String>, stat: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            index: index.into(),
            stat: stat.into(),
        }
    }

    /// Decode a stored catalog row
    pub fn from_row(row: &Row) -> Result<Self> {
        if row.len() != STAT_COLUMNS.len() {
            return Err(Error::TableColumnsNotMatch {
                expected: STAT_COLUMNS.len(),
                got: row.len(),
            });
        }
        let text = |i: usize| -> Result<String> {
            row[i]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| Error::Type(format!("{} is not text", STAT_COLUMNS[i])))
        };
        Ok(Self {
            table: text(0)?,
            index: text(1)?,
            stat: text(2)?,
        })
    }

    /// Parse the stat string back into integers
    pub fn estimates(&self) -> Result<Vec<u64>> {
        if self.stat.is_empty() || self.stat.starts_with(' ') || self.stat.ends_with(' ') {
            return Err(Error::parse(format!("malformed stat '{}'", self.stat)));
        }
        self.stat
            .split(' ')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| Error::parse(format!("malformed stat '{}'", self.stat)))
            })
            .collect()
    }
}
