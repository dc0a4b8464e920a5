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

//! Prefix distinct counting
//!
//! A single forward pass over an index in sort order yields the row count `K`
//! and, for every prefix of the key columns, the number of distinct prefix
//! values `D[i]`. Because rows arrive sorted, a prefix value can only repeat
//! in consecutive rows: comparing each row against the previous one is enough,
//! and no set of seen values is kept.
//!
//! For each row, find the first column `p` that differs from the previous
//! row. Every prefix of length `p` or more has a new value, so `D[p..N]` are
//! incremented and the remembered values from `p` on are replaced. Shorter
//! prefixes are unchanged.
//!
//! The remembered values start as NULL and NULL never compares equal, so the
//! first row always counts, and so does every row with a NULL key column.

use crate::core::{Error, Result, Value};
use crate::storage::Scanner;
use crate::vdbe::{CursorId, Op, ProgramBuilder, Slot};

/// Result of a prefix distinct count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixCounts {
    /// Number of rows scanned (`K`)
    pub rows: u64,
    /// Distinct values of each column prefix (`D[1..N]`)
    pub distinct: Vec<u64>,
}

/// Running state of one index analysis
#[derive(Debug)]
pub struct RunningCounters {
    rows: u64,
    distinct: Vec<u64>,
    last: Vec<Value>,
}

impl RunningCounters {
    /// Counters for an index with `columns` key columns
    pub fn new(columns: usize) -> Self {
        Self {
            rows: 0,
            distinct: vec![0; columns],
            last: vec![Value::Null; columns],
        }
    }

    /// Account for the next row in sort order
    pub fn observe(&mut self, key: &[Value]) {
        self.rows += 1;
        let columns = self.last.len();
        let changed = (0..columns).find(|&i| {
            let value = key.get(i).unwrap_or(&Value::Null);
            value.is_null() || self.last[i].is_null() || *value != self.last[i]
        });
        if let Some(p) = changed {
            for i in p..columns {
                self.distinct[i] += 1;
                self.last[i] = key.get(i).cloned().unwrap_or_default();
            }
        }
    }

    /// Finish counting
    pub fn finish(self) -> PrefixCounts {
        PrefixCounts {
            rows: self.rows,
            distinct: self.distinct,
        }
    }
}

/// Count rows and prefix distinct values over an ordered scan
pub fn count_prefix_distinct(scanner: &mut dyn Scanner, columns: usize) -> Result<PrefixCounts> {
    if columns == 0 {
        return Err(Error::internal("an index has at least one column"));
    }
    let mut counters = RunningCounters::new(columns);
    while scanner.next() {
        counters.observe(scanner.row());
    }
    if let Some(err) = scanner.err() {
        return Err(err.clone());
    }
    Ok(counters.finish())
}

/// Slot layout of the frame pushed for one index
///
/// | slots | content |
/// |-------|---------|
/// | `0` | row count `K` |
/// | `1..=N` | distinct counts `D[i]` |
/// | `N+1..=2N` | last seen value of column `i` |
/// | `2N+1` | current column value |
/// | `2N+2` | catalog row id |
/// | `2N+3..2N+6` | catalog record |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchFrame {
    columns: u16,
}

impl ScratchFrame {
    /// Layout for an index with `columns` key columns
    pub fn new(columns: usize) -> Result<Self> {
        let columns = u16::try_from(columns)
            .ok()
            .filter(|n| *n > 0 && *n <= (u16::MAX - 6) / 2)
            .ok_or_else(|| Error::internal(format!("cannot analyze an index of {} columns", columns)))?;
        Ok(Self { columns })
    }

    #[inline]
    pub fn columns(&self) -> u16 {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> Slot {
        0
    }

    #[inline]
    pub fn distinct(&self, column: u16) -> Slot {
        1 + column
    }

    #[inline]
    pub fn last(&self, column: u16) -> Slot {
        1 + self.columns + column
    }

    #[inline]
    pub fn current(&self) -> Slot {
        1 + 2 * self.columns
    }

    #[inline]
    pub fn rowid(&self) -> Slot {
        2 + 2 * self.columns
    }

    #[inline]
    pub fn record(&self) -> Slot {
        3 + 2 * self.columns
    }

    /// Total slots in the frame
    #[inline]
    pub fn size(&self) -> u16 {
        6 + 2 * self.columns
    }
}

/// Emit the counting loop over an open read cursor
///
/// Leaves `K` and `D[i]` in the frame; the cursor is positioned past the end.
pub fn emit_prefix_count(builder: &mut ProgramBuilder, frame: &ScratchFrame, cursor: CursorId) {
    let n = frame.columns();

    builder.emit(Op::Integer {
        value: 0,
        dest: frame.rows(),
    });
    for i in 0..n {
        builder.emit(Op::Integer {
            value: 0,
            dest: frame.distinct(i),
        });
    }
    builder.emit(Op::Null {
        dest: frame.last(0),
        count: n,
    });

    let done = builder.new_label();
    builder.emit_jump(Op::Rewind { cursor, if_empty: 0 }, done);
    let top = builder.position();
    let next = builder.new_label();
    let bump: Vec<_> = (0..n).map(|_| builder.new_label()).collect();

    builder.emit(Op::AddImm {
        slot: frame.rows(),
        value: 1,
    });
    for (i, label) in (0..n).zip(&bump) {
        builder.emit(Op::Column {
            cursor,
            column: i as usize,
            dest: frame.current(),
        });
        builder.emit_jump(
            Op::Ne {
                lhs: frame.current(),
                rhs: frame.last(i),
                target: 0,
            },
            *label,
        );
    }
    builder.emit_jump(Op::Goto { target: 0 }, next);

    // Column i differs: every prefix of length i+1.. has a new value
    for (i, label) in (0..n).zip(&bump) {
        builder.resolve_label(*label);
        builder.emit(Op::AddImm {
            slot: frame.distinct(i),
            value: 1,
        });
        builder.emit(Op::Column {
            cursor,
            column: i as usize,
            dest: frame.last(i),
        });
    }

    builder.resolve_label(next);
    builder.emit(Op::Next {
        cursor,
        if_more: top,
    });
    builder.resolve_label(done);
}
