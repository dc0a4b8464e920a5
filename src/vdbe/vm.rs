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

// Statistics Program Virtual Machine
//
// The VM executes a compiled Program against a Storage implementation.
// - Linear instruction dispatch, no recursion
// - Slots live in frames; `PushFrame` allocates a fresh frame of NULLs
// - Any error rolls back every write operation the program opened
// - `Halt` (or running off the end) commits

use rustc_hash::FxHashMap;

use super::ops::{CursorId, Op, Root, Slot};
use super::program::Program;
use crate::analyze::encoder::stat_string;
use crate::core::{Error, Result, Row, Value};
use crate::storage::{DbId, RootPage, Scanner, Storage};

/// Open cursor state
enum CursorState {
    Read {
        scanner: Box<dyn Scanner>,
        root: RootPage,
        /// Width every scanned row must have
        columns: usize,
    },
    Write {
        db: DbId,
        root: RootPage,
    },
}

/// What a program run changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    /// Rows inserted through write cursors
    pub rows_written: usize,
    /// Rows removed by `DeleteMatching`
    pub rows_deleted: usize,
    /// Operations dispatched
    pub ops_executed: usize,
}

/// Program executor
pub struct Vm<'a> {
    storage: &'a mut dyn Storage,
    cursors: FxHashMap<CursorId, CursorState>,
    frames: Vec<Vec<Value>>,
    in_transaction: bool,
}

impl<'a> Vm<'a> {
    /// Create a VM over a storage
    pub fn new(storage: &'a mut dyn Storage) -> Self {
        Self {
            storage,
            cursors: FxHashMap::default(),
            frames: Vec::new(),
            in_transaction: false,
        }
    }

    /// Execute a program
    ///
    /// On failure every write operation opened by the program is rolled back
    /// before the error is returned.
    pub fn execute(&mut self, program: &Program) -> Result<ExecutionSummary> {
        self.cursors.clear();
        self.frames = vec![vec![Value::Null; program.base_slots() as usize]];
        self.in_transaction = false;

        match self.run(program) {
            Ok(summary) => Ok(summary),
            Err(err) => {
                self.cursors.clear();
                self.frames.clear();
                if self.in_transaction {
                    tracing::warn!(error = %err, "statistics program failed, rolling back");
                    self.storage.rollback();
                    self.in_transaction = false;
                }
                Err(err)
            }
        }
    }

    fn run(&mut self, program: &Program) -> Result<ExecutionSummary> {
        let ops = program.ops();
        let mut summary = ExecutionSummary::default();
        let mut pc = 0usize;

        // Main execution loop
        loop {
            if pc >= ops.len() {
                return self.halt(summary);
            }
            summary.ops_executed += 1;

            match &ops[pc] {
                Op::Transaction { db } => {
                    self.storage.begin_write(*db)?;
                    self.in_transaction = true;
                    pc += 1;
                }

                Op::CreateTable {
                    db,
                    name,
                    columns,
                    root_dest,
                } => {
                    let columns: Vec<&str> = columns.iter().map(|c| c.as_ref()).collect();
                    let root = self
                        .storage
                        .create_table(*db, name, &columns)
                        .map_err(|e| Error::catalog_prepare(name.as_ref(), e.to_string()))?;
                    self.set(*root_dest, Value::Integer(root as i64))?;
                    pc += 1;
                }

                Op::DeleteMatching {
                    db,
                    root,
                    column,
                    value,
                } => {
                    let removed = self
                        .storage
                        .delete_matching(*db, *root, *column, value)
                        .map_err(|e| Error::catalog_prepare(format!("root {}", root), e.to_string()))?;
                    summary.rows_deleted += removed;
                    pc += 1;
                }

                Op::Clear { db, root } => {
                    self.storage
                        .clear(*db, *root)
                        .map_err(|e| Error::catalog_prepare(format!("root {}", root), e.to_string()))?;
                    pc += 1;
                }

                Op::OpenWrite { cursor, db, root } => {
                    let root = match root {
                        Root::Page(page) => *page,
                        Root::Slot(slot) => self.root_from_slot(*slot)?,
                    };
                    self.cursors
                        .insert(*cursor, CursorState::Write { db: *db, root });
                    pc += 1;
                }

                Op::OpenRead {
                    cursor,
                    db,
                    root,
                    columns,
                } => {
                    let scanner = self.storage.open_scan(*db, *root).map_err(|e| match e {
                        Error::StorageScan { .. } => e,
                        other => Error::storage_scan(*root, other.to_string()),
                    })?;
                    self.cursors.insert(
                        *cursor,
                        CursorState::Read {
                            scanner,
                            root: *root,
                            columns: *columns,
                        },
                    );
                    pc += 1;
                }

                Op::Close { cursor } => {
                    if let Some(CursorState::Read { mut scanner, .. }) = self.cursors.remove(cursor)
                    {
                        scanner.close()?;
                    }
                    pc += 1;
                }

                Op::Rewind { cursor, if_empty } => {
                    pc = if self.advance(*cursor)? {
                        pc + 1
                    } else {
                        *if_empty as usize
                    };
                }

                Op::Next { cursor, if_more } => {
                    pc = if self.advance(*cursor)? {
                        *if_more as usize
                    } else {
                        pc + 1
                    };
                }

                Op::Column {
                    cursor,
                    column,
                    dest,
                } => {
                    let value = match self.cursors.get(cursor) {
                        Some(CursorState::Read { scanner, .. }) => {
                            scanner.row().get(*column).cloned().unwrap_or_default()
                        }
                        _ => return Err(Error::InvalidCursor(*cursor)),
                    };
                    self.set(*dest, value)?;
                    pc += 1;
                }

                Op::PushFrame { slots } => {
                    self.frames.push(vec![Value::Null; *slots as usize]);
                    pc += 1;
                }

                Op::PopFrame => {
                    if self.frames.len() <= 1 {
                        return Err(Error::internal("pop of the base frame"));
                    }
                    self.frames.pop();
                    pc += 1;
                }

                Op::Integer { value, dest } => {
                    self.set(*dest, Value::Integer(*value))?;
                    pc += 1;
                }

                Op::Null { dest, count } => {
                    for slot in *dest..dest + count {
                        self.set(slot, Value::Null)?;
                    }
                    pc += 1;
                }

                Op::String { value, dest } => {
                    self.set(*dest, Value::text_arc(value.clone()))?;
                    pc += 1;
                }

                Op::AddImm { slot, value } => {
                    let current = match self.get(*slot)? {
                        Value::Null => 0,
                        Value::Integer(v) => *v,
                        other => return Err(Error::Type(format!("cannot increment {}", other))),
                    };
                    self.set(*slot, Value::Integer(current.wrapping_add(*value)))?;
                    pc += 1;
                }

                Op::Ne { lhs, rhs, target } => {
                    let (a, b) = (self.get(*lhs)?, self.get(*rhs)?);
                    pc = if a.is_null() || b.is_null() || a != b {
                        *target as usize
                    } else {
                        pc + 1
                    };
                }

                Op::Goto { target } => {
                    pc = *target as usize;
                }

                Op::IfNot { slot, target } => {
                    pc = if self.get(*slot)?.is_truthy() {
                        pc + 1
                    } else {
                        *target as usize
                    };
                }

                Op::Halt => return self.halt(summary),

                Op::Selectivity {
                    rows,
                    distinct,
                    count,
                    dest,
                } => {
                    let k = self.counter(*rows)?;
                    let d = (*distinct..distinct + count)
                        .map(|slot| self.counter(slot))
                        .collect::<Result<Vec<u64>>>()?;
                    let stat = stat_string(k, &d)
                        .ok_or_else(|| Error::internal("no statistics for an empty index"))?;
                    self.set(*dest, Value::text(stat))?;
                    pc += 1;
                }

                Op::NewRowid { cursor, dest } => {
                    let (db, root) = self.write_cursor(*cursor)?;
                    let rowid = self.storage.new_rowid(db, root)?;
                    self.set(*dest, Value::Integer(rowid))?;
                    pc += 1;
                }

                Op::Insert {
                    cursor,
                    rowid,
                    start,
                    len,
                } => {
                    let (db, root) = self.write_cursor(*cursor)?;
                    let rowid = self
                        .get(*rowid)?
                        .as_int64()
                        .ok_or_else(|| Error::Type("row id is not an integer".to_string()))?;
                    let record = (*start..start + len)
                        .map(|slot| self.get(slot).cloned())
                        .collect::<Result<Row>>()?;
                    self.storage.insert(db, root, rowid, record)?;
                    summary.rows_written += 1;
                    pc += 1;
                }
            }
        }
    }

    fn halt(&mut self, summary: ExecutionSummary) -> Result<ExecutionSummary> {
        for (_, state) in self.cursors.drain() {
            if let CursorState::Read { mut scanner, .. } = state {
                scanner.close()?;
            }
        }
        if self.in_transaction {
            self.storage.commit()?;
            self.in_transaction = false;
        }
        Ok(summary)
    }

    /// Step a read cursor; false once the scan is exhausted
    fn advance(&mut self, cursor: CursorId) -> Result<bool> {
        match self.cursors.get_mut(&cursor) {
            Some(CursorState::Read {
                scanner,
                root,
                columns,
            }) => {
                if scanner.next() {
                    let width = scanner.row().len();
                    if width < *columns {
                        return Err(Error::storage_scan(
                            *root,
                            format!("row has {} columns, expected {}", width, columns),
                        ));
                    }
                    return Ok(true);
                }
                match scanner.err() {
                    Some(Error::StorageScan { root, message }) => {
                        Err(Error::storage_scan(*root, message.clone()))
                    }
                    Some(err) => Err(Error::storage_scan(*root, err.to_string())),
                    None => Ok(false),
                }
            }
            _ => Err(Error::InvalidCursor(cursor)),
        }
    }

    fn write_cursor(&self, cursor: CursorId) -> Result<(DbId, RootPage)> {
        match self.cursors.get(&cursor) {
            Some(CursorState::Write { db, root }) => Ok((*db, *root)),
            _ => Err(Error::InvalidCursor(cursor)),
        }
    }

    fn root_from_slot(&self, slot: Slot) -> Result<RootPage> {
        self.get(slot)?
            .as_int64()
            .and_then(|v| RootPage::try_from(v).ok())
            .ok_or_else(|| Error::Type("root page is not a page number".to_string()))
    }

    fn counter(&self, slot: Slot) -> Result<u64> {
        self.get(slot)?
            .as_int64()
            .and_then(|v| u64::try_from(v).ok())
            .ok_or_else(|| Error::Type(format!("slot {} does not hold a counter", slot)))
    }

    fn get(&self, slot: Slot) -> Result<&Value> {
        let frame = self
            .frames
            .last()
            .ok_or_else(|| Error::internal("no active frame"))?;
        frame.get(slot as usize).ok_or(Error::InvalidSlot {
            slot,
            size: frame.len(),
        })
    }

    fn set(&mut self, slot: Slot, value: Value) -> Result<()> {
        let frame = self
            .frames
            .last_mut()
            .ok_or_else(|| Error::internal("no active frame"))?;
        let size = frame.len();
        let target = frame
            .get_mut(slot as usize)
            .ok_or(Error::InvalidSlot { slot, size })?;
        *target = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryEngine, SchemaResolver, MAIN_DB};
    use crate::vdbe::ProgramBuilder;

    fn seeded_engine() -> (MemoryEngine, RootPage) {
        let mut engine = MemoryEngine::new();
        engine.define_table(MAIN_DB, "t", &["a"]).unwrap();
        let root = engine.define_index(MAIN_DB, "t", "ta", &["a"]).unwrap();
        for v in [3, 1, 2] {
            engine.insert_row(MAIN_DB, "t", vec![Value::Integer(v)]).unwrap();
        }
        (engine, root)
    }

    #[test]
    fn test_scan_loop_counts_rows() {
        let (mut engine, root) = seeded_engine();
        let mut b = ProgramBuilder::new();
        b.emit(Op::Transaction { db: MAIN_DB });
        let created = b.alloc_base_slot();
        b.emit(Op::CreateTable {
            db: MAIN_DB,
            name: "out".into(),
            columns: vec!["n".into()].into(),
            root_dest: created,
        });
        b.emit(Op::OpenWrite {
            cursor: 0,
            db: MAIN_DB,
            root: Root::Slot(created),
        });
        b.emit(Op::PushFrame { slots: 2 });
        b.emit(Op::Integer { value: 0, dest: 0 });
        b.emit(Op::OpenRead {
            cursor: 1,
            db: MAIN_DB,
            root,
            columns: 1,
        });
        let done = b.new_label();
        b.emit_jump(
            Op::Rewind {
                cursor: 1,
                if_empty: 0,
            },
            done,
        );
        let top = b.position();
        b.emit(Op::AddImm { slot: 0, value: 1 });
        b.emit(Op::Next {
            cursor: 1,
            if_more: top,
        });
        b.resolve_label(done);
        b.emit(Op::Close { cursor: 1 });
        b.emit(Op::NewRowid { cursor: 0, dest: 1 });
        b.emit(Op::Insert {
            cursor: 0,
            rowid: 1,
            start: 0,
            len: 1,
        });
        b.emit(Op::PopFrame);
        b.emit(Op::Halt);
        let program = b.build().unwrap();

        let summary = Vm::new(&mut engine).execute(&program).unwrap();
        assert_eq!(summary.rows_written, 1);
        let rows = engine.table_rows(MAIN_DB, "out").unwrap();
        assert_eq!(rows, vec![Row::from_values(vec![Value::Integer(3)])]);
        assert!(!engine.in_write(MAIN_DB));
    }

    #[test]
    fn test_ne_treats_null_as_unequal() {
        let mut engine = MemoryEngine::new();
        let mut b = ProgramBuilder::new();
        b.emit(Op::PushFrame { slots: 3 });
        // slot 0 and 1 are both NULL: must jump
        let taken = b.new_label();
        b.emit_jump(
            Op::Ne {
                lhs: 0,
                rhs: 1,
                target: 0,
            },
            taken,
        );
        b.emit(Op::Halt);
        b.resolve_label(taken);
        b.emit(Op::Integer { value: 1, dest: 2 });
        b.emit(Op::IfNot { slot: 2, target: 0 });
        b.emit(Op::Halt);
        let program = b.build().unwrap();

        let summary = Vm::new(&mut engine).execute(&program).unwrap();
        assert_eq!(summary.ops_executed, 5);
    }

    #[test]
    fn test_error_rolls_back() {
        let (mut engine, _) = seeded_engine();
        let t_root = engine.find_table("t", MAIN_DB).unwrap().root;
        let mut b = ProgramBuilder::new();
        b.emit(Op::Transaction { db: MAIN_DB });
        b.emit(Op::Clear {
            db: MAIN_DB,
            root: t_root,
        });
        b.emit(Op::OpenRead {
            cursor: 0,
            db: MAIN_DB,
            root: 999,
            columns: 1,
        });
        b.emit(Op::Halt);
        let program = b.build().unwrap();

        let err = Vm::new(&mut engine).execute(&program).unwrap_err();
        assert!(matches!(err, Error::StorageScan { root: 999, .. }));
        assert_eq!(engine.table_rows(MAIN_DB, "t").unwrap().len(), 3);
        assert!(!engine.in_write(MAIN_DB));
    }

    #[test]
    fn test_short_index_row_is_scan_error() {
        let (mut engine, root) = seeded_engine();
        let mut b = ProgramBuilder::new();
        b.emit(Op::Transaction { db: MAIN_DB });
        // Index keys hold one column plus the row id
        b.emit(Op::OpenRead {
            cursor: 0,
            db: MAIN_DB,
            root,
            columns: 3,
        });
        b.emit(Op::Rewind {
            cursor: 0,
            if_empty: 0,
        });
        b.emit(Op::Halt);
        let program = b.build().unwrap();

        let err = Vm::new(&mut engine).execute(&program).unwrap_err();
        assert!(
            matches!(&err, Error::StorageScan { root: r, message } if *r == root && message.contains("2 columns")),
            "{:?}",
            err
        );
        assert!(!engine.in_write(MAIN_DB));
    }

    #[test]
    fn test_invalid_slot_and_cursor() {
        let mut engine = MemoryEngine::new();
        let mut b = ProgramBuilder::new();
        b.emit(Op::Integer { value: 1, dest: 4 });
        let program = b.build().unwrap();
        assert_eq!(
            Vm::new(&mut engine).execute(&program).unwrap_err(),
            Error::InvalidSlot { slot: 4, size: 0 }
        );

        let mut b = ProgramBuilder::new();
        b.emit(Op::PushFrame { slots: 1 });
        b.emit(Op::Column {
            cursor: 3,
            column: 0,
            dest: 0,
        });
        let program = b.build().unwrap();
        assert_eq!(
            Vm::new(&mut engine).execute(&program).unwrap_err(),
            Error::InvalidCursor(3)
        );
    }

    #[test]
    fn test_create_failure_is_catalog_error() {
        let mut engine = MemoryEngine::new();
        engine.define_table(MAIN_DB, "s", &["x"]).unwrap();
        let mut b = ProgramBuilder::new();
        b.emit(Op::Transaction { db: MAIN_DB });
        let slot = b.alloc_base_slot();
        b.emit(Op::CreateTable {
            db: MAIN_DB,
            name: "s".into(),
            columns: vec!["x".into()].into(),
            root_dest: slot,
        });
        let program = b.build().unwrap();
        let err = Vm::new(&mut engine).execute(&program).unwrap_err();
        assert!(matches!(err, Error::CatalogPrepare { .. }));
    }
}
