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

//! Per-table index plan compilation
//!
//! Emits one frame, one ordered scan and one catalog write per index of a table.

use crate::core::Result;
use crate::storage::TableDef;
use crate::vdbe::{CursorId, Op, ProgramBuilder};

use super::config::AnalyzeConfig;
use super::counter::{emit_prefix_count, ScratchFrame};
use super::encoder::emit_stat_row;
use super::prepare::WriteHandle;

/// Emit the analysis of every index of `table`
///
/// Each index gets its own frame, an ordered scan on `index_cursor`, the
/// counting loop and the catalog row write. Tables with fewer than
/// `config.min_indexes` indexes produce no code. Returns the number of
/// indexes compiled.
pub fn compile_table(
    builder: &mut ProgramBuilder,
    table: &TableDef,
    handle: &WriteHandle,
    index_cursor: CursorId,
    config: &AnalyzeConfig,
) -> Result<usize> {
    if table.indexes.is_empty() || table.indexes.len() < config.min_indexes {
        tracing::debug!(
            table = %table.name,
            indexes = table.indexes.len(),
            "skipping table with too few indexes"
        );
        return Ok(0);
    }

    for index in &table.indexes {
        let frame = ScratchFrame::new(index.column_count())?;
        tracing::trace!(table = %table.name, index = %index.name, slots = frame.size(), "compiling index");

        builder.note_frame(frame.size());
        builder.emit(Op::PushFrame {
            slots: frame.size(),
        });
        builder.emit(Op::OpenRead {
            cursor: index_cursor,
            db: table.db,
            root: index.root,
            columns: index.column_count() + 1,
        });
        builder.comment(index.name.as_str());

        emit_prefix_count(builder, &frame, index_cursor);
        builder.emit(Op::Close {
            cursor: index_cursor,
        });

        emit_stat_row(builder, &frame, handle, &table.name, &index.name);
        builder.emit(Op::PopFrame);
    }

    Ok(table.indexes.len())
}
