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

//! ANALYZE configuration
//!
//! Names the catalog table and decides which tables and databases an
//! unqualified `ANALYZE` covers.

use crate::storage::statistics::DEFAULT_STAT_TABLE;

/// Configuration options for statistics compilation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeConfig {
    /// Name of the statistics catalog table
    /// Default: "sqlite_stat1"
    pub stat_table: String,

    /// Tables with fewer indexes than this are not analyzed
    /// Default: 2
    pub min_indexes: usize,

    /// Skip the session-local database when analyzing every database
    /// Default: true
    pub skip_temp: bool,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            stat_table: DEFAULT_STAT_TABLE.to_string(),
            min_indexes: 2,
            skip_temp: true,
        }
    }
}

impl AnalyzeConfig {
    /// Creates an AnalyzeConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the statistics catalog table name
    pub fn with_stat_table(mut self, name: impl Into<String>) -> Self {
        self.stat_table = name.into();
        self
    }

    /// Sets the minimum index count for a table to be analyzed
    pub fn with_min_indexes(mut self, min_indexes: usize) -> Self {
        self.min_indexes = min_indexes;
        self
    }

    /// Sets whether the session-local database is skipped
    pub fn with_skip_temp(mut self, skip_temp: bool) -> Self {
        self.skip_temp = skip_temp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzeConfig::new();
        assert_eq!(config.stat_table, "sqlite_stat1");
        assert_eq!(config.min_indexes, 2);
        assert!(config.skip_temp);
    }

    #[test]
    fn test_builders() {
        let config = AnalyzeConfig::new()
            .with_stat_table("stats")
            .with_min_indexes(1)
            .with_skip_temp(false);
        assert_eq!(config.stat_table, "stats");
        assert_eq!(config.min_indexes, 1);
        assert!(!config.skip_temp);
    }
}
