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

//! Storage trait consumed by program execution
//!
//! Programs only ever write the statistics catalog table; every other tree is
//! read through ordered scans.

use crate::core::{Result, Row, Value};

use super::scanner::Scanner;
use super::schema::{DbId, RootPage};

/// Storage is the write-side and scan-side surface a program runs against
///
/// All mutating calls must happen inside an exclusive write opened with
/// [`Storage::begin_write`] for the same database.
pub trait Storage {
    /// Begins (or joins) the exclusive write operation on a database
    fn begin_write(&mut self, db: DbId) -> Result<()>;

    /// Returns true if a write operation is open on the database
    fn in_write(&self, db: DbId) -> bool;

    /// Commits every open write operation
    fn commit(&mut self) -> Result<()>;

    /// Rolls back every open write operation
    fn rollback(&mut self);

    /// Creates a table and returns its root page
    fn create_table(&mut self, db: DbId, name: &str, columns: &[&str]) -> Result<RootPage>;

    /// Deletes the rows whose `column` equals `value`, returning how many were removed
    fn delete_matching(
        &mut self,
        db: DbId,
        root: RootPage,
        column: usize,
        value: &Value,
    ) -> Result<usize>;

    /// Removes every row of a table
    fn clear(&mut self, db: DbId, root: RootPage) -> Result<()>;

    /// Opens an ordered scan over a table or index tree
    fn open_scan(&self, db: DbId, root: RootPage) -> Result<Box<dyn Scanner>>;

    /// Allocates a fresh row id for a table
    fn new_rowid(&mut self, db: DbId, root: RootPage) -> Result<i64>;

    /// Inserts a record under the given row id
    fn insert(&mut self, db: DbId, root: RootPage, rowid: i64, record: Row) -> Result<()>;
}
