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

//! ANALYZE statistics compiler
//!
//! Turns an `ANALYZE` statement into a [`Program`](crate::vdbe::Program)
//! that scans every selected index once and records, per index, the row
//! count and the average number of rows sharing each key prefix.
//!
//! - [`scope`]: name resolution and program assembly
//! - [`prepare`]: catalog table creation or cleanup
//! - [`index`]: per-table, per-index plan
//! - [`counter`]: prefix-distinct counting loop
//! - [`encoder`]: selectivity arithmetic and the catalog row write

pub mod config;
pub mod counter;
pub mod encoder;
pub mod index;
pub mod prepare;
pub mod scope;

pub use config::AnalyzeConfig;
pub use counter::{count_prefix_distinct, PrefixCounts, RunningCounters, ScratchFrame};
pub use encoder::{encode, selectivity, stat_string};
pub use prepare::{StatTableState, WriteHandle};
pub use scope::{compile_analyze, AnalysisScope, StatCompiler};
