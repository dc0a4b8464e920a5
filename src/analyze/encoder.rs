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

//! Selectivity encoding
//!
//! Turns a row count `K` and prefix distinct counts `D[1..N]` into the stat
//! string stored in the catalog table. Entry `i` is `ceil(K / D[i])`, the
//! average number of rows sharing one value of the first `i` columns.

use std::sync::Arc;

use crate::storage::StatRecord;
use crate::vdbe::{Op, ProgramBuilder};

use super::counter::ScratchFrame;
use super::prepare::WriteHandle;

/// Average rows per distinct value, rounded up
///
/// Returns `None` when `distinct` is zero.
#[inline]
pub fn selectivity(rows: u64, distinct: u64) -> Option<u64> {
    if distinct == 0 {
        return None;
    }
    Some(rows.div_ceil(distinct))
}

/// Encode the stat string for one index
///
/// Returns `None` for an empty index (`rows == 0`); every distinct count is
/// at least one as soon as a single row exists.
pub fn stat_string(rows: u64, distinct: &[u64]) -> Option<String> {
    if rows == 0 || distinct.is_empty() {
        return None;
    }
    let estimates = distinct
        .iter()
        .map(|d| selectivity(rows, *d).map(|e| e.to_string()))
        .collect::<Option<Vec<_>>>()?;
    Some(estimates.join(" "))
}

/// Build the catalog row for one index, or `None` if the index is empty
pub fn encode(table: &str, index: &str, rows: u64, distinct: &[u64]) -> Option<StatRecord> {
    stat_string(rows, distinct).map(|stat| StatRecord::new(table, index, stat))
}

/// Emit the code that writes the catalog row for one index
///
/// The row is skipped at run time when the row counter is zero.
pub fn emit_stat_row(
    builder: &mut ProgramBuilder,
    frame: &ScratchFrame,
    handle: &WriteHandle,
    table: &str,
    index: &str,
) {
    let skip = builder.new_label();
    builder.emit_jump(
        Op::IfNot {
            slot: frame.rows(),
            target: 0,
        },
        skip,
    );
    builder.emit(Op::NewRowid {
        cursor: handle.cursor,
        dest: frame.rowid(),
    });
    let record = frame.record();
    builder.emit(Op::String {
        value: Arc::from(table),
        dest: record,
    });
    builder.emit(Op::String {
        value: Arc::from(index),
        dest: record + 1,
    });
    builder.emit(Op::Selectivity {
        rows: frame.rows(),
        distinct: frame.distinct(0),
        count: frame.columns(),
        dest: record + 2,
    });
    builder.emit(Op::Insert {
        cursor: handle.cursor,
        rowid: frame.rowid(),
        start: record,
        len: 3,
    });
    builder.resolve_label(skip);
}
