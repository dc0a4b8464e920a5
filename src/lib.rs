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

//! # Statcomp - ANALYZE statistics compiler
//!
//! Statcomp compiles SQLite-style `ANALYZE` statements into register
//! programs that scan each index once, in key order, and record how
//! selective every key prefix is. The results land in a three-column
//! catalog table (`sqlite_stat1` by default) that a query planner reads to
//! estimate how many rows an equality lookup on an index prefix returns.
//!
//! ## Quick Start
//!
//! ```rust
//! use statcomp::{Database, Value};
//!
//! let db = Database::open_in_memory().unwrap();
//! db.create_table("t1", &["a", "b"]).unwrap();
//! db.create_index("t1", "t1_a", &["a"]).unwrap();
//! db.create_index("t1", "t1_ab", &["a", "b"]).unwrap();
//! for (a, b) in [(1, 1), (1, 2), (2, 1), (2, 2)] {
//!     db.insert("t1", vec![Value::integer(a), Value::integer(b)]).unwrap();
//! }
//!
//! db.analyze("ANALYZE t1").unwrap();
//! let stats = db.stat_rows("main").unwrap();
//! assert_eq!(stats.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`api`] - Public database interface ([`api::Database`])
//! - [`core`] - Core types ([`Value`], [`Row`], [`Error`])
//! - [`parser`] - `ANALYZE` statement parser
//! - [`analyze`] - Scope resolution and plan generation
//! - [`vdbe`] - Register program, builder and interpreter
//! - [`storage`] - Schema and storage interfaces, in-memory engine

pub mod analyze;
pub mod api;
pub mod core;
pub mod parser;
pub mod storage;
pub mod vdbe;

// Re-export main types for convenience
pub use core::{Error, Result, Row, Value};

pub use analyze::{compile_analyze, AnalysisScope, AnalyzeConfig};
pub use parser::{parse_analyze, parse_qualified_name, AnalyzeStatement, AnalyzeTarget};

pub use storage::{
    DbId, IndexDef, MemoryEngine, RootPage, Scanner, SchemaResolver, StatRecord, Storage,
    TableDef, VecScanner, DEFAULT_STAT_TABLE, MAIN_DB, TEMP_DB,
};

pub use vdbe::{ExecutionSummary, Op, Program, ProgramBuilder, Vm};

pub use api::Database;
