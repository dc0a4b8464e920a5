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

//! Storage traits for statcomp
//!
//! - [`SchemaResolver`] - Name resolution and structural metadata
//! - [`Storage`] - Write operations and ordered scans used by programs
//! - [`Scanner`] - Ordered row iteration

pub mod engine;
pub mod scanner;
pub mod schema;

pub use engine::Storage;
pub use scanner::{Scanner, VecScanner};
pub use schema::{DbId, IndexDef, RootPage, SchemaResolver, TableDef, MAIN_DB, TEMP_DB};
