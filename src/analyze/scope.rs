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

//! Scope resolution and program assembly
//!
//! An `ANALYZE` statement names nothing, a database, or one table. The
//! name is resolved against the schema once, then the compiler walks the
//! resolved scope and emits one catalog preparation per database followed by
//! the per-index scans.

use crate::core::{Error, Result};
use crate::parser::{AnalyzeStatement, AnalyzeTarget};
use crate::storage::{DbId, SchemaResolver, MAIN_DB, TEMP_DB};
use crate::vdbe::{CursorId, Op, Program, ProgramBuilder};

use super::config::AnalyzeConfig;
use super::index::compile_table;
use super::prepare::prepare_stat_table;

/// What a single `ANALYZE` covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisScope {
    /// Every attached database
    AllDatabases,
    /// Every table of one database
    OneDatabase(DbId),
    /// A single table
    OneTable { db: DbId, table: String },
}

impl AnalysisScope {
    /// Resolve the names of a parsed statement
    ///
    /// A lone name is tried as a database first, then as a table of the
    /// main database.
    pub fn resolve(stmt: &AnalyzeStatement, schema: &dyn SchemaResolver) -> Result<Self> {
        match &stmt.target {
            AnalyzeTarget::All => Ok(AnalysisScope::AllDatabases),
            AnalyzeTarget::Name(name) => {
                if let Some(db) = schema.find_database(name) {
                    return Ok(AnalysisScope::OneDatabase(db));
                }
                match schema.find_table(name, MAIN_DB) {
                    Some(table) => Ok(AnalysisScope::OneTable {
                        db: MAIN_DB,
                        table: table.name.clone(),
                    }),
                    None => Err(Error::TableNotFound(name.clone())),
                }
            }
            AnalyzeTarget::Qualified { database, table } => {
                let db = schema
                    .find_database(database)
                    .ok_or_else(|| Error::DatabaseNotFound(database.clone()))?;
                match schema.find_table(table, db) {
                    Some(def) => Ok(AnalysisScope::OneTable {
                        db,
                        table: def.name.clone(),
                    }),
                    None => Err(Error::TableNotFound(format!("{}.{}", database, table))),
                }
            }
        }
    }
}

/// Builds the program for one resolved scope
pub struct StatCompiler<'a> {
    schema: &'a dyn SchemaResolver,
    config: &'a AnalyzeConfig,
    builder: ProgramBuilder,
    next_cursor: CursorId,
}

impl<'a> StatCompiler<'a> {
    pub fn new(schema: &'a dyn SchemaResolver, config: &'a AnalyzeConfig) -> Self {
        Self {
            schema,
            config,
            builder: ProgramBuilder::new(),
            next_cursor: 0,
        }
    }

    /// Emit the code for `scope`
    pub fn compile_scope(&mut self, scope: &AnalysisScope) -> Result<()> {
        match scope {
            AnalysisScope::AllDatabases => {
                for db in 0..self.schema.database_count() {
                    if db == TEMP_DB && self.config.skip_temp {
                        tracing::debug!(db, "skipping temp database");
                        continue;
                    }
                    self.analyze_database(db)?;
                }
                Ok(())
            }
            AnalysisScope::OneDatabase(db) => self.analyze_database(*db),
            AnalysisScope::OneTable { db, table } => self.analyze_table(*db, table),
        }
    }

    /// Two cursors per database: the catalog writer and the index reader
    fn alloc_cursors(&mut self) -> (CursorId, CursorId) {
        let stat = self.next_cursor;
        self.next_cursor += 2;
        (stat, stat + 1)
    }

    fn analyze_database(&mut self, db: DbId) -> Result<()> {
        let name = self
            .schema
            .database_name(db)
            .ok_or_else(|| Error::DatabaseNotFound(db.to_string()))?;
        tracing::debug!(db, database = name, "analyzing database");

        let (stat_cursor, index_cursor) = self.alloc_cursors();
        let handle = prepare_stat_table(
            &mut self.builder,
            self.schema,
            self.config,
            db,
            None,
            stat_cursor,
        )?;

        let mut indexes = 0;
        for table in self.schema.tables(db) {
            indexes += compile_table(&mut self.builder, table, &handle, index_cursor, self.config)?;
        }
        tracing::debug!(db, indexes, "database compiled");
        Ok(())
    }

    fn analyze_table(&mut self, db: DbId, name: &str) -> Result<()> {
        let table = self
            .schema
            .find_table(name, db)
            .ok_or_else(|| Error::TableNotFound(name.to_string()))?;
        tracing::debug!(db, table = %table.name, "analyzing table");

        let (stat_cursor, index_cursor) = self.alloc_cursors();
        let handle = prepare_stat_table(
            &mut self.builder,
            self.schema,
            self.config,
            db,
            Some(&table.name),
            stat_cursor,
        )?;
        compile_table(&mut self.builder, table, &handle, index_cursor, self.config)?;
        Ok(())
    }

    /// Terminate the program and resolve its jumps
    pub fn finish(mut self) -> Result<Program> {
        self.builder.emit(Op::Halt);
        self.builder.build()
    }
}

/// Compile an `ANALYZE` statement into an executable program
pub fn compile_analyze(
    stmt: &AnalyzeStatement,
    schema: &dyn SchemaResolver,
    config: &AnalyzeConfig,
) -> Result<Program> {
    schema.read_schema()?;
    let scope = AnalysisScope::resolve(stmt, schema)?;
    tracing::debug!(statement = %stmt, ?scope, "compiling analyze");

    let mut compiler = StatCompiler::new(schema, config);
    compiler.compile_scope(&scope)?;
    let program = compiler.finish()?;
    tracing::trace!(ops = program.len(), "\n{}", program.disassemble());
    Ok(program)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::parser::parse_analyze;
    use crate::storage::{MemoryEngine, TableDef};

    fn engine() -> MemoryEngine {
        let mut engine = MemoryEngine::new();
        engine.define_table(MAIN_DB, "t1", &["a", "b"]).unwrap();
        engine.define_index(MAIN_DB, "t1", "t1_a", &["a"]).unwrap();
        engine.define_index(MAIN_DB, "t1", "t1_ab", &["a", "b"]).unwrap();
        let aux = engine.attach("aux").unwrap();
        engine.define_table(aux, "t1", &["x"]).unwrap();
        engine
    }

    /// Resolver whose schema must be loaded before use
    struct LazySchema {
        engine: MemoryEngine,
        load_error: Option<Error>,
        loads: Cell<usize>,
        lookups: Cell<usize>,
    }

    impl LazySchema {
        fn new(load_error: Option<Error>) -> Self {
            Self {
                engine: engine(),
                load_error,
                loads: Cell::new(0),
                lookups: Cell::new(0),
            }
        }

        fn looked_up(&self) {
            self.lookups.set(self.lookups.get() + 1);
        }
    }

    impl SchemaResolver for LazySchema {
        fn read_schema(&self) -> Result<()> {
            self.loads.set(self.loads.get() + 1);
            match &self.load_error {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }

        fn database_count(&self) -> usize {
            self.looked_up();
            self.engine.database_count()
        }

        fn database_name(&self, db: DbId) -> Option<&str> {
            self.looked_up();
            self.engine.database_name(db)
        }

        fn find_database(&self, name: &str) -> Option<DbId> {
            self.looked_up();
            self.engine.find_database(name)
        }

        fn find_table(&self, name: &str, db: DbId) -> Option<&TableDef> {
            self.looked_up();
            self.engine.find_table(name, db)
        }

        fn tables(&self, db: DbId) -> Vec<&TableDef> {
            self.looked_up();
            self.engine.tables(db)
        }
    }

    #[test]
    fn test_schema_load_error_stops_compilation() {
        let schema = LazySchema::new(Some(Error::Io {
            message: "malformed schema page".to_string(),
        }));
        for sql in ["ANALYZE", "ANALYZE t1", "ANALYZE aux.t1"] {
            let err = compile_analyze(
                &parse_analyze(sql).unwrap(),
                &schema,
                &AnalyzeConfig::default(),
            )
            .unwrap_err();
            assert_eq!(
                err,
                Error::Io {
                    message: "malformed schema page".to_string()
                }
            );
        }
        assert_eq!(schema.loads.get(), 3);
        assert_eq!(schema.lookups.get(), 0);
        assert!(schema.engine.find_table("sqlite_stat1", MAIN_DB).is_none());
    }

    #[test]
    fn test_schema_is_loaded_before_resolution() {
        let schema = LazySchema::new(None);
        let program = compile_analyze(
            &parse_analyze("ANALYZE t1").unwrap(),
            &schema,
            &AnalyzeConfig::default(),
        )
        .unwrap();
        assert_eq!(schema.loads.get(), 1);
        assert!(schema.lookups.get() > 0);
        assert!(matches!(program.ops().last(), Some(Op::Halt)));
    }

    fn resolve(sql: &str, engine: &MemoryEngine) -> Result<AnalysisScope> {
        AnalysisScope::resolve(&parse_analyze(sql).unwrap(), engine)
    }

    #[test]
    fn test_resolve_forms() {
        let engine = engine();
        assert_eq!(resolve("ANALYZE", &engine).unwrap(), AnalysisScope::AllDatabases);
        assert_eq!(resolve("ANALYZE aux", &engine).unwrap(), AnalysisScope::OneDatabase(2));
        assert_eq!(
            resolve("ANALYZE T1", &engine).unwrap(),
            AnalysisScope::OneTable {
                db: MAIN_DB,
                table: "t1".to_string()
            }
        );
        assert_eq!(
            resolve("ANALYZE aux.t1", &engine).unwrap(),
            AnalysisScope::OneTable {
                db: 2,
                table: "t1".to_string()
            }
        );
    }

    #[test]
    fn test_database_name_wins_over_table() {
        let mut engine = engine();
        engine.define_table(MAIN_DB, "aux", &["a"]).unwrap();
        assert_eq!(resolve("ANALYZE aux", &engine).unwrap(), AnalysisScope::OneDatabase(2));
    }

    #[test]
    fn test_resolve_errors() {
        let engine = engine();
        assert!(matches!(
            resolve("ANALYZE nope", &engine).unwrap_err(),
            Error::TableNotFound(_)
        ));
        assert!(matches!(
            resolve("ANALYZE nope.t1", &engine).unwrap_err(),
            Error::DatabaseNotFound(_)
        ));
        assert!(matches!(
            resolve("ANALYZE aux.t2", &engine).unwrap_err(),
            Error::TableNotFound(_)
        ));
    }

    #[test]
    fn test_all_databases_skips_temp() {
        let engine = engine();
        let config = AnalyzeConfig::default();
        let program = compile_analyze(&parse_analyze("ANALYZE").unwrap(), &engine, &config).unwrap();
        let dbs: Vec<DbId> = program
            .ops()
            .iter()
            .filter_map(|op| match op {
                Op::Transaction { db } => Some(*db),
                _ => None,
            })
            .collect();
        assert_eq!(dbs, vec![MAIN_DB, 2]);

        let config = config.with_skip_temp(false);
        let program = compile_analyze(&parse_analyze("ANALYZE").unwrap(), &engine, &config).unwrap();
        let count = program
            .ops()
            .iter()
            .filter(|op| matches!(op, Op::Transaction { .. }))
            .count();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_program_ends_with_halt() {
        let engine = engine();
        let program = compile_analyze(
            &parse_analyze("ANALYZE t1").unwrap(),
            &engine,
            &AnalyzeConfig::default(),
        )
        .unwrap();
        assert!(matches!(program.ops().last(), Some(Op::Halt)));
        let scans = program
            .ops()
            .iter()
            .filter(|op| matches!(op, Op::OpenRead { .. }))
            .count();
        assert_eq!(scans, 2);
    }

    #[test]
    fn test_cursors_are_distinct_per_database() {
        let engine = engine();
        let program = compile_analyze(
            &parse_analyze("ANALYZE").unwrap(),
            &engine,
            &AnalyzeConfig::default(),
        )
        .unwrap();
        let writers: Vec<CursorId> = program
            .ops()
            .iter()
            .filter_map(|op| match op {
                Op::OpenWrite { cursor, .. } => Some(*cursor),
                _ => None,
            })
            .collect();
        assert_eq!(writers, vec![0, 2]);
    }
}
