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

//! Top-level Database API
//!
//! # Quick Start
//!
//! ```ignore
//! use statcomp::{Database, Value};
//!
//! let db = Database::open_in_memory()?;
//! db.create_table("orders", &["customer", "day"])?;
//! db.create_index("orders", "orders_customer", &["customer"])?;
//! db.create_index("orders", "orders_customer_day", &["customer", "day"])?;
//! db.insert("orders", vec![Value::integer(1), Value::text("mon")])?;
//!
//! // Whole connection, one database, or one table
//! db.analyze("ANALYZE")?;
//! db.analyze("ANALYZE main")?;
//! db.analyze("ANALYZE main.orders")?;
//!
//! // Inspect the generated program
//! println!("{}", db.prepare_analyze("ANALYZE orders")?.disassemble());
//! ```

mod database;

pub use database::Database;
