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

//! Statistics catalog table preparation
//!
//! Before any index of a database is analyzed, the catalog table must exist
//! and hold no rows for the tables about to be analyzed. The state of the
//! table is inspected once at compile time and mapped to one of three plans.

use std::sync::Arc;

use crate::core::{Error, Result, Value};
use crate::storage::statistics::{STAT_COLUMNS, STAT_TABLE_COLUMN};
use crate::storage::{DbId, RootPage, SchemaResolver};
use crate::vdbe::{CursorId, Op, ProgramBuilder, Root};

use super::config::AnalyzeConfig;

/// What must happen to the catalog table before new rows are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatTableState {
    /// The table does not exist and must be created
    Absent,
    /// The table exists; only rows of `table` are removed
    PresentScoped { root: RootPage, table: String },
    /// The table exists; every row is removed
    PresentWhole { root: RootPage },
}

impl StatTableState {
    /// Inspect the catalog table of `db`
    ///
    /// `target` names the single table being analyzed, or `None` when the
    /// whole database is.
    pub fn inspect(
        schema: &dyn SchemaResolver,
        db: DbId,
        stat_table: &str,
        target: Option<&str>,
    ) -> Result<Self> {
        let Some(existing) = schema.find_table(stat_table, db) else {
            return Ok(StatTableState::Absent);
        };
        if existing.columns.len() != STAT_COLUMNS.len() {
            return Err(Error::catalog_prepare(
                stat_table,
                format!(
                    "expected {} columns, found {}",
                    STAT_COLUMNS.len(),
                    existing.columns.len()
                ),
            ));
        }
        Ok(match target {
            Some(table) => StatTableState::PresentScoped {
                root: existing.root,
                table: table.to_string(),
            },
            None => StatTableState::PresentWhole {
                root: existing.root,
            },
        })
    }
}

/// Write access to the catalog table inside the generated program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteHandle {
    /// Database holding the catalog table
    pub db: DbId,
    /// Write cursor opened on the catalog table
    pub cursor: CursorId,
    /// Where the cursor's root page comes from
    pub root: Root,
}

/// Emit the code that readies the catalog table of `db` and opens it for writing
///
/// The emitted code begins (or joins) the exclusive write operation on `db`;
/// committing it is left to the end of the program.
pub fn prepare_stat_table(
    builder: &mut ProgramBuilder,
    schema: &dyn SchemaResolver,
    config: &AnalyzeConfig,
    db: DbId,
    target: Option<&str>,
    cursor: CursorId,
) -> Result<WriteHandle> {
    let state = StatTableState::inspect(schema, db, &config.stat_table, target)?;
    tracing::debug!(db, stat_table = %config.stat_table, ?state, "preparing catalog table");

    builder.emit(Op::Transaction { db });
    let root = match state {
        StatTableState::Absent => {
            let slot = builder.alloc_base_slot();
            builder.emit(Op::CreateTable {
                db,
                name: Arc::from(config.stat_table.as_str()),
                columns: STAT_COLUMNS.iter().map(|c| Arc::from(*c)).collect(),
                root_dest: slot,
            });
            Root::Slot(slot)
        }
        StatTableState::PresentScoped { root, table } => {
            builder.emit(Op::DeleteMatching {
                db,
                root,
                column: STAT_TABLE_COLUMN,
                value: Value::text(table),
            });
            Root::Page(root)
        }
        StatTableState::PresentWhole { root } => {
            builder.emit(Op::Clear { db, root });
            Root::Page(root)
        }
    };
    builder.emit(Op::OpenWrite { cursor, db, root });
    builder.comment(config.stat_table.as_str());

    Ok(WriteHandle { db, cursor, root })
}
