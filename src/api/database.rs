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

//! Database handle
//!
//! Owns an in-memory engine and runs `ANALYZE` against it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::analyze::{compile_analyze, AnalyzeConfig};
use crate::core::{Error, Result, Value};
use crate::parser::{parse_analyze, parse_qualified_name};
use crate::storage::{DbId, MemoryEngine, RootPage, SchemaResolver, StatRecord, MAIN_DB};
use crate::vdbe::{ExecutionSummary, Program, Vm};

struct DatabaseInner {
    engine: Mutex<MemoryEngine>,
    config: AnalyzeConfig,
}

/// Database handle
///
/// Cheap to clone; clones share the same engine.
///
/// # Example
///
/// ```ignore
/// use statcomp::{Database, Value};
///
/// let db = Database::open_in_memory()?;
/// db.create_table("t1", &["a", "b"])?;
/// db.create_index("t1", "t1_a", &["a"])?;
/// db.create_index("t1", "t1_ab", &["a", "b"])?;
/// db.insert("t1", vec![Value::integer(1), Value::integer(1)])?;
///
/// db.analyze("ANALYZE t1")?;
/// for record in db.stat_rows("main")? {
///     println!("{} {} {}", record.table, record.index, record.stat);
/// }
/// ```
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Open an in-memory database with the default configuration
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::with_config(AnalyzeConfig::default()))
    }

    /// Open an in-memory database with a custom analysis configuration
    pub fn with_config(config: AnalyzeConfig) -> Self {
        Database {
            inner: Arc::new(DatabaseInner {
                engine: Mutex::new(MemoryEngine::new()),
                config,
            }),
        }
    }

    pub fn config(&self) -> &AnalyzeConfig {
        &self.inner.config
    }

    /// Attach an empty database under `name`
    pub fn attach(&self, name: &str) -> Result<DbId> {
        self.inner.engine.lock().attach(name)
    }

    /// Resolves `table` or `db.table`; either part may be quoted
    fn qualify(engine: &MemoryEngine, name: &str) -> Result<(DbId, String)> {
        match parse_qualified_name(name)? {
            (Some(database), table) => {
                let db = engine
                    .find_database(&database)
                    .ok_or(Error::DatabaseNotFound(database))?;
                Ok((db, table))
            }
            (None, table) => Ok((MAIN_DB, table)),
        }
    }

    /// Create a table; `name` may be qualified as `db.table`
    pub fn create_table(&self, name: &str, columns: &[&str]) -> Result<RootPage> {
        let mut engine = self.inner.engine.lock();
        let (db, table) = Self::qualify(&engine, name)?;
        engine.define_table(db, &table, columns)
    }

    /// Create an index on `table` and fill it from the existing rows
    pub fn create_index(&self, table: &str, name: &str, columns: &[&str]) -> Result<RootPage> {
        let mut engine = self.inner.engine.lock();
        let (db, table) = Self::qualify(&engine, table)?;
        engine.define_index(db, &table, name, columns)
    }

    /// Insert a row and return its row id
    pub fn insert(&self, table: &str, values: Vec<Value>) -> Result<i64> {
        let mut engine = self.inner.engine.lock();
        let (db, table) = Self::qualify(&engine, table)?;
        engine.insert_row(db, &table, values)
    }

    /// Parse and compile an `ANALYZE` statement without running it
    pub fn prepare_analyze(&self, sql: &str) -> Result<Program> {
        let stmt = parse_analyze(sql)?;
        let engine = self.inner.engine.lock();
        compile_analyze(&stmt, &*engine, &self.inner.config)
    }

    /// Parse, compile and run an `ANALYZE` statement
    ///
    /// Compilation and execution happen under one lock so the schema the
    /// program was built against cannot change before it runs.
    pub fn analyze(&self, sql: &str) -> Result<ExecutionSummary> {
        let stmt = parse_analyze(sql)?;
        let mut engine = self.inner.engine.lock();
        let program = compile_analyze(&stmt, &*engine, &self.inner.config)?;
        let summary = Vm::new(&mut *engine).execute(&program)?;
        tracing::info!(
            statement = %stmt,
            rows_written = summary.rows_written,
            rows_deleted = summary.rows_deleted,
            "analyze complete"
        );
        Ok(summary)
    }

    /// Rows of the statistics table of `database`
    ///
    /// Empty when the table has not been created yet.
    pub fn stat_rows(&self, database: &str) -> Result<Vec<StatRecord>> {
        let engine = self.inner.engine.lock();
        let db = engine
            .find_database(database)
            .ok_or_else(|| Error::DatabaseNotFound(database.to_string()))?;
        match engine.table_rows(db, &self.inner.config.stat_table) {
            Ok(rows) => rows.iter().map(StatRecord::from_row).collect(),
            Err(err) if err.is_not_found() => Ok(Vec::new()),
            Err(err) => Err(err),
        }
    }

    /// Rows of any table, in row id order
    pub fn table_rows(&self, table: &str) -> Result<Vec<crate::core::Row>> {
        let engine = self.inner.engine.lock();
        let (db, table) = Self::qualify(&engine, table)?;
        engine.table_rows(db, &table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_table("t1", &["a", "b"]).unwrap();
        db.create_index("t1", "t1_a", &["a"]).unwrap();
        db.create_index("t1", "t1_ab", &["a", "b"]).unwrap();
        for (a, b) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
            db.insert("t1", vec![Value::integer(a), Value::integer(b)])
                .unwrap();
        }
        db
    }

    #[test]
    fn test_analyze_writes_one_row_per_index() {
        let db = seeded();
        let summary = db.analyze("ANALYZE t1").unwrap();
        assert_eq!(summary.rows_written, 2);

        let mut rows = db.stat_rows("main").unwrap();
        rows.sort_by(|a, b| a.index.cmp(&b.index));
        assert_eq!(
            rows,
            vec![
                StatRecord::new("t1", "t1_a", "2"),
                StatRecord::new("t1", "t1_ab", "2 1"),
            ]
        );
    }

    #[test]
    fn test_stat_rows_before_analyze_is_empty() {
        let db = seeded();
        assert!(db.stat_rows("main").unwrap().is_empty());
        assert!(matches!(
            db.stat_rows("nope").unwrap_err(),
            Error::DatabaseNotFound(_)
        ));
    }

    #[test]
    fn test_qualified_names() {
        let db = Database::open_in_memory().unwrap();
        db.attach("aux").unwrap();
        db.create_table("aux.t2", &["x"]).unwrap();
        db.insert("aux.t2", vec![Value::integer(7)]).unwrap();
        assert_eq!(db.table_rows("aux.t2").unwrap().len(), 1);
        assert!(db.table_rows("t2").is_err());
        assert!(matches!(
            db.create_table("zz.t", &["x"]).unwrap_err(),
            Error::DatabaseNotFound(_)
        ));
    }

    #[test]
    fn test_quoted_name_with_dot() {
        let db = Database::open_in_memory().unwrap();
        db.attach("aux").unwrap();
        db.create_table("aux.\"a.b\"", &["x", "y"]).unwrap();
        db.create_index("aux.\"a.b\"", "ab_x", &["x"]).unwrap();
        db.create_index("aux.\"a.b\"", "ab_xy", &["x", "y"]).unwrap();
        db.insert("aux.\"a.b\"", vec![Value::integer(1), Value::integer(2)])
            .unwrap();

        db.analyze("ANALYZE aux.\"a.b\"").unwrap();
        let rows = db.stat_rows("aux").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.table == "a.b"));
        assert!(matches!(
            db.create_table("aux.a.b", &["x"]).unwrap_err(),
            Error::Parse(_)
        ));
    }

    #[test]
    fn test_prepare_does_not_execute() {
        let db = seeded();
        let program = db.prepare_analyze("ANALYZE").unwrap();
        assert!(!program.is_empty());
        assert!(db.stat_rows("main").unwrap().is_empty());
    }

    #[test]
    fn test_custom_stat_table() {
        let db = Database::with_config(AnalyzeConfig::default().with_stat_table("stats"));
        db.create_table("t1", &["a"]).unwrap();
        db.create_index("t1", "i1", &["a"]).unwrap();
        db.create_index("t1", "i2", &["a"]).unwrap();
        db.insert("t1", vec![Value::integer(1)]).unwrap();
        db.analyze("ANALYZE").unwrap();
        assert_eq!(db.stat_rows("main").unwrap().len(), 2);
        assert_eq!(db.table_rows("stats").unwrap().len(), 2);
    }
}
