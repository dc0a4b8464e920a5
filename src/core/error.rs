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

//! Error types for statcomp
//!
//! Every failure the compiler, the VM or the reference engine can report is a
//! variant of [`Error`]. Failures are never swallowed: they propagate to the
//! caller and abort the enclosing write transaction.

use thiserror::Error;

/// Result type alias for statcomp operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // =========================================================================
    // Schema resolution errors
    // =========================================================================
    /// No attached database carries this name
    #[error("unknown database '{0}'")]
    DatabaseNotFound(String),

    /// Table not found in the database
    #[error("no such table: {0}")]
    TableNotFound(String),

    /// Table already exists when trying to create
    #[error("table '{0}' already exists")]
    TableAlreadyExists(String),

    /// Column not found in table
    #[error("column '{0}' not found")]
    ColumnNotFound(String),

    /// Row width does not match the table definition
    #[error("table columns don't match, expected {expected}, got {got}")]
    TableColumnsNotMatch { expected: usize, got: usize },

    // =========================================================================
    // Catalog and storage errors
    // =========================================================================
    /// Creating or clearing the statistics catalog table failed
    #[error("cannot prepare catalog table '{table}': {message}")]
    CatalogPrepare { table: String, message: String },

    /// Ordered scan of an index failed
    #[error("scan of root page {root} failed: {message}")]
    StorageScan { root: u32, message: String },

    /// Root page does not name any tree in the database
    #[error("root page {0} not found")]
    RootNotFound(u32),

    // =========================================================================
    // Program errors
    // =========================================================================
    /// A jump refers to a label that was never resolved
    #[error("label {0} was never resolved")]
    UnresolvedLabel(usize),

    /// Instruction refers to a cursor that is not open
    #[error("cursor {0} is not open")]
    InvalidCursor(u16),

    /// Instruction refers to a slot outside the current frame
    #[error("slot {slot} out of range for frame of {size}")]
    InvalidSlot { slot: u16, size: usize },

    // =========================================================================
    // Transaction errors
    // =========================================================================
    /// Write attempted outside of a write transaction
    #[error("transaction not started")]
    TransactionNotStarted,

    // =========================================================================
    // Other errors
    // =========================================================================
    /// Parse error
    #[error("parse error: {0}")]
    Parse(String),

    /// Type error
    #[error("type error: {0}")]
    Type(String),

    /// IO error (wrapped)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error for unexpected conditions
    #[error("{message}")]
    Internal { message: String },
}

impl Error {
    /// Create a new Parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Error::Parse(message.into())
    }

    /// Create a new Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Error::Internal {
            message: message.into(),
        }
    }

    /// Create a new CatalogPrepare error
    pub fn catalog_prepare(table: impl Into<String>, message: impl Into<String>) -> Self {
        Error::CatalogPrepare {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a new StorageScan error
    pub fn storage_scan(root: u32, message: impl Into<String>) -> Self {
        Error::StorageScan {
            root,
            message: message.into(),
        }
    }

    /// Check if this is a "not found" type error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::DatabaseNotFound(_)
                | Error::TableNotFound(_)
                | Error::ColumnNotFound(_)
                | Error::RootNotFound(_)
        )
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
        }
    }
}
