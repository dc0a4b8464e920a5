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

//! Schema resolution interface
//!
//! The compiler only reads structural metadata: which databases are attached,
//! which tables each one holds, and the column list and root page of every
//! index. Everything it learns here is baked into the emitted program.

use crate::core::Result;

/// Position of an attached database
pub type DbId = usize;

/// Root page of a table or index tree
pub type RootPage = u32;

/// The default database
pub const MAIN_DB: DbId = 0;

/// The session-local database
pub const TEMP_DB: DbId = 1;

/// Secondary index metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    /// Index name
    pub name: String,
    /// Root page of the index tree
    pub root: RootPage,
    /// Indexed columns, in key order
    pub columns: Vec<String>,
}

impl IndexDef {
    /// Number of key columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

/// Table metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    /// Table name
    pub name: String,
    /// Database holding the table
    pub db: DbId,
    /// Root page of the table tree
    pub root: RootPage,
    /// Column names
    pub columns: Vec<String>,
    /// Secondary indexes in creation order
    pub indexes: Vec<IndexDef>,
}

impl TableDef {
    /// Position of a column, case-insensitive
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }
}

/// SchemaResolver maps names to structural metadata
pub trait SchemaResolver {
    /// Loads the schema if it is not loaded yet
    ///
    /// Called once before any code is generated.
    fn read_schema(&self) -> Result<()> {
        Ok(())
    }

    /// Number of attached databases, including main and temp
    fn database_count(&self) -> usize;

    /// Name of an attached database
    fn database_name(&self, db: DbId) -> Option<&str>;

    /// Finds an attached database by name (case-insensitive)
    fn find_database(&self, name: &str) -> Option<DbId>;

    /// Finds a table by name within one database (case-insensitive)
    fn find_table(&self, name: &str, db: DbId) -> Option<&TableDef>;

    /// All tables of a database
    fn tables(&self, db: DbId) -> Vec<&TableDef>;
}
