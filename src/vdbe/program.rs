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

// Statistics Program
//
// A Program is the linear instruction sequence the ANALYZE compiler emits.
// ProgramBuilder is the only way to make one: it appends operations to an
// arena indexed by address and resolves forward jumps through labels. A jump
// to a label that is not yet bound records (address, label) in a fixup list;
// binding the label patches every recorded jump.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use super::ops::{Address, Op, Slot};
use crate::core::{Error, Result};

/// Compiled statistics program
#[derive(Clone)]
pub struct Program {
    ops: Vec<Op>,
    comments: Vec<Option<Arc<str>>>,
    /// Slots in the base frame (per-database handles)
    base_slots: u16,
    /// Largest frame pushed by the program
    max_frame_slots: u16,
}

impl Program {
    /// Get the operations
    #[inline]
    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    /// Comment attached to the operation at `addr`
    pub fn comment(&self, addr: usize) -> Option<&str> {
        self.comments.get(addr).and_then(|c| c.as_deref())
    }

    /// Number of slots in the base frame
    #[inline]
    pub fn base_slots(&self) -> u16 {
        self.base_slots
    }

    /// Size of the largest frame the program pushes
    #[inline]
    pub fn max_frame_slots(&self) -> u16 {
        self.max_frame_slots
    }

    /// Get the number of operations
    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Check if program is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Disassemble the program for debugging
    pub fn disassemble(&self) -> String {
        let mut result = String::new();
        for (i, op) in self.ops.iter().enumerate() {
            match self.comment(i) {
                Some(comment) => result.push_str(&format!("{:04}: {:?}  # {}\n", i, op, comment)),
                None => result.push_str(&format!("{:04}: {:?}\n", i, op)),
            }
        }
        result
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("ops_count", &self.ops.len())
            .field("base_slots", &self.base_slots)
            .field("max_frame_slots", &self.max_frame_slots)
            .finish()
    }
}

/// Forward-referenceable jump destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Label(usize);

/// Builder for constructing programs
pub struct ProgramBuilder {
    ops: Vec<Op>,
    comments: Vec<Option<Arc<str>>>,
    labels: Vec<Option<Address>>,
    fixups: SmallVec<[(usize, Label); 8]>,
    base_slots: u16,
    max_frame_slots: u16,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self {
            ops: Vec::with_capacity(64),
            comments: Vec::with_capacity(64),
            labels: Vec::new(),
            fixups: SmallVec::new(),
            base_slots: 0,
            max_frame_slots: 0,
        }
    }

    /// Emit an operation, returning its address
    #[inline]
    pub fn emit(&mut self, op: Op) -> Address {
        let addr = self.position();
        self.ops.push(op);
        self.comments.push(None);
        addr
    }

    /// Emit a jump whose target is `label`
    ///
    /// The target field of `op` is overwritten once the label is bound.
    pub fn emit_jump(&mut self, op: Op, label: Label) -> Address {
        let addr = self.emit(op);
        match self.labels.get(label.0).copied().flatten() {
            Some(target) => self.patch_jump(addr as usize, target),
            None => self.fixups.push((addr as usize, label)),
        }
        addr
    }

    /// Get current position (for jump targets)
    #[inline]
    pub fn position(&self) -> Address {
        self.ops.len() as Address
    }

    /// Create an unbound label
    pub fn new_label(&mut self) -> Label {
        self.labels.push(None);
        Label(self.labels.len() - 1)
    }

    /// Bind a label to the current position and patch pending jumps to it
    pub fn resolve_label(&mut self, label: Label) {
        let target = self.position();
        if let Some(slot) = self.labels.get_mut(label.0) {
            *slot = Some(target);
        }
        let mut i = 0;
        while i < self.fixups.len() {
            if self.fixups[i].1 == label {
                let (pos, _) = self.fixups.swap_remove(i);
                self.patch_jump(pos, target);
            } else {
                i += 1;
            }
        }
    }

    /// Patch a jump target at a specific position
    pub fn patch_jump(&mut self, pos: usize, target: Address) {
        if let Some(t) = self.ops.get_mut(pos).and_then(Op::jump_target_mut) {
            *t = target;
        }
    }

    /// Attach a comment to the most recently emitted operation
    pub fn comment(&mut self, text: impl Into<Arc<str>>) {
        if let Some(last) = self.comments.last_mut() {
            *last = Some(text.into());
        }
    }

    /// Reserve a slot in the base frame
    pub fn alloc_base_slot(&mut self) -> Slot {
        self.base_slots += 1;
        self.base_slots - 1
    }

    /// Record that a frame of `slots` slots will be pushed
    pub fn note_frame(&mut self, slots: u16) {
        self.max_frame_slots = self.max_frame_slots.max(slots);
    }

    /// Build the final program
    ///
    /// Fails if a jump still refers to an unbound label or points past the end.
    pub fn build(self) -> Result<Program> {
        if let Some((_, label)) = self.fixups.first() {
            return Err(Error::UnresolvedLabel(label.0));
        }
        let end = self.ops.len() as Address;
        if let Some((addr, _)) = self
            .ops
            .iter()
            .enumerate()
            .find(|(_, op)| op.jump_target().is_some_and(|t| t > end))
        {
            return Err(Error::internal(format!(
                "jump at {} targets past the end of the program",
                addr
            )));
        }
        Ok(Program {
            ops: self.ops,
            comments: self.comments,
            base_slots: self.base_slots,
            max_frame_slots: self.max_frame_slots,
        })
    }
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}
