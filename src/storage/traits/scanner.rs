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

//! Scanner trait for ordered index scans

use std::sync::Arc;

use crate::core::{Error, Result, Row};

/// Scanner yields the rows of a tree in sort order
///
/// `next()` advances to the next row and `row()` returns the current row.
/// Only the current row is held; nothing is buffered ahead.
///
/// # Example
///
/// ```ignore
/// let mut scanner = storage.open_scan(db, root)?;
/// while scanner.next() {
///     let row = scanner.row();
///     // Process row...
/// }
/// if let Some(err) = scanner.err() {
///     // Handle error...
/// }
/// scanner.close()?;
/// ```
pub trait Scanner {
    /// Advances the scanner to the next row
    ///
    /// Returns `true` if there is another row available, `false` otherwise.
    /// After returning `false`, the caller should check `err()` to see if
    /// iteration stopped due to an error.
    fn next(&mut self) -> bool;

    /// Returns the current row
    ///
    /// Valid until the next call to `next()` or `close()`.
    fn row(&self) -> &Row;

    /// Returns any error that occurred during scanning
    fn err(&self) -> Option<&Error>;

    /// Closes the scanner and releases any resources
    fn close(&mut self) -> Result<()>;
}

/// A scanner over a shared, already sorted vector of rows
///
/// The rows are shared with the owning tree, so opening a scan is O(1) and
/// later writes to the tree do not disturb an open scan.
pub struct VecScanner {
    rows: Arc<Vec<Row>>,
    current_index: Option<usize>,
    empty_row: Row,
    closed: bool,
}

impl VecScanner {
    /// Creates a new scanner over the given rows
    pub fn new(rows: Arc<Vec<Row>>) -> Self {
        Self {
            rows,
            current_index: None,
            empty_row: Row::new(),
            closed: false,
        }
    }
}

impl Scanner for VecScanner {
    fn next(&mut self) -> bool {
        if self.closed {
            return false;
        }
        let next = self.current_index.map_or(0, |i| i + 1);
        if next < self.rows.len() {
            self.current_index = Some(next);
            true
        } else {
            self.current_index = Some(self.rows.len());
            false
        }
    }

    fn row(&self) -> &Row {
        self.current_index
            .and_then(|i| self.rows.get(i))
            .unwrap_or(&self.empty_row)
    }

    fn err(&self) -> Option<&Error> {
        None
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    fn rows(values: &[i64]) -> Arc<Vec<Row>> {
        Arc::new(
            values
                .iter()
                .map(|v| Row::from_values(vec![Value::Integer(*v)]))
                .collect(),
        )
    }

    #[test]
    fn test_vec_scanner_yields_in_order() {
        let mut scanner = VecScanner::new(rows(&[1, 2, 3]));
        let mut seen = Vec::new();
        while scanner.next() {
            seen.push(scanner.row()[0].clone());
        }
        assert_eq!(seen, vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);
        assert!(!scanner.next());
        assert!(scanner.err().is_none());
    }

    #[test]
    fn test_vec_scanner_empty_and_closed() {
        let mut scanner = VecScanner::new(rows(&[]));
        assert!(!scanner.next());
        assert!(scanner.row().is_empty());

        let mut scanner = VecScanner::new(rows(&[1]));
        scanner.close().unwrap();
        assert!(!scanner.next());
    }
}
