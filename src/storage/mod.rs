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

//! Storage layer for statcomp
//!
//! - [`traits`] - Collaborator interfaces: schema resolution, storage, scanners
//! - [`statistics`] - Statistics catalog table contract
//! - [`memory`] - In-memory reference engine implementing both interfaces

pub mod memory;
pub mod statistics;
pub mod traits;

pub use memory::MemoryEngine;
pub use statistics::{StatRecord, DEFAULT_STAT_TABLE, STAT_COLUMNS};
pub use traits::{
    DbId, IndexDef, RootPage, Scanner, SchemaResolver, Storage, TableDef, VecScanner, MAIN_DB,
    TEMP_DB,
};
