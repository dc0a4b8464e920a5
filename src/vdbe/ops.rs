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

// Statistics Program Operations
//
// The instruction set emitted by the ANALYZE compiler. Operands are resolved
// at compile time: database ids, root pages, cursor numbers, frame slots and
// jump addresses. Slots always address the frame on top of the frame stack.

use std::sync::Arc;

use crate::core::Value;
use crate::storage::{DbId, RootPage};

/// Frame slot number
pub type Slot = u16;

/// Cursor number
pub type CursorId = u16;

/// Instruction address within a program
pub type Address = u32;

/// Where a write cursor finds its root page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Root {
    /// Root page known at compile time
    Page(RootPage),
    /// Root page stored in a slot by an earlier `CreateTable`
    Slot(Slot),
}

/// Program operations
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    // =========================================================================
    // Transaction and catalog maintenance
    // =========================================================================
    /// Begin (or join) the exclusive write operation on a database
    Transaction { db: DbId },

    /// Create a table and store its root page in `root_dest`
    CreateTable {
        db: DbId,
        name: Arc<str>,
        columns: Arc<[Arc<str>]>,
        root_dest: Slot,
    },

    /// Delete the rows of a table whose `column` equals `value`
    DeleteMatching {
        db: DbId,
        root: RootPage,
        column: usize,
        value: Value,
    },

    /// Remove every row of a table
    Clear { db: DbId, root: RootPage },

    // =========================================================================
    // Cursors
    // =========================================================================
    /// Open a write cursor on a table
    OpenWrite { cursor: CursorId, db: DbId, root: Root },

    /// Open an ordered read cursor on an index with `columns` key columns
    OpenRead {
        cursor: CursorId,
        db: DbId,
        root: RootPage,
        columns: usize,
    },

    /// Close a cursor
    Close { cursor: CursorId },

    /// Move to the first row; jump to `if_empty` when there is none
    Rewind { cursor: CursorId, if_empty: Address },

    /// Advance; jump to `if_more` while rows remain
    Next { cursor: CursorId, if_more: Address },

    /// Copy column `column` of the current row into `dest`
    Column {
        cursor: CursorId,
        column: usize,
        dest: Slot,
    },

    // =========================================================================
    // Frames and slots
    // =========================================================================
    /// Push a fresh frame of `slots` NULL slots
    PushFrame { slots: u16 },

    /// Drop the frame on top of the stack
    PopFrame,

    /// Store an integer
    Integer { value: i64, dest: Slot },

    /// Store NULL into `count` slots starting at `dest`
    Null { dest: Slot, count: u16 },

    /// Store a string
    String { value: Arc<str>, dest: Slot },

    /// Add an immediate to an integer slot
    AddImm { slot: Slot, value: i64 },

    // =========================================================================
    // Control flow
    // =========================================================================
    /// Jump when the slots differ or either one is NULL
    Ne { lhs: Slot, rhs: Slot, target: Address },

    /// Unconditional jump
    Goto { target: Address },

    /// Jump when the slot is NULL or zero
    IfNot { slot: Slot, target: Address },

    /// Commit and stop
    Halt,

    // =========================================================================
    // Statistics output
    // =========================================================================
    /// Encode `count` distinct counters starting at `distinct` against the
    /// row count in `rows` into a stat string stored in `dest`
    Selectivity {
        rows: Slot,
        distinct: Slot,
        count: u16,
        dest: Slot,
    },

    /// Allocate a fresh row id for the table under a write cursor
    NewRowid { cursor: CursorId, dest: Slot },

    /// Insert the record made of `len` slots starting at `start`
    Insert {
        cursor: CursorId,
        rowid: Slot,
        start: Slot,
        len: u16,
    },
}

impl Op {
    /// Mutable access to the jump target, for backpatching
    pub fn jump_target_mut(&mut self) -> Option<&mut Address> {
        match self {
            Op::Rewind { if_empty: t, .. }
            | Op::Next { if_more: t, .. }
            | Op::Ne { target: t, .. }
            | Op::Goto { target: t }
            | Op::IfNot { target: t, .. } => Some(t),
            _ => None,
        }
    }

    /// The jump target, if this is a jump
    pub fn jump_target(&self) -> Option<Address> {
        match self {
            Op::Rewind { if_empty: t, .. }
            | Op::Next { if_more: t, .. }
            | Op::Ne { target: t, .. }
            | Op::Goto { target: t }
            | Op::IfNot { target: t, .. } => Some(*t),
            _ => None,
        }
    }
}
