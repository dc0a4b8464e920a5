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

//! In-memory reference engine
//!
//! [`MemoryEngine`] keeps every attached database in memory and implements
//! both collaborator interfaces the ANALYZE compiler relies on: schema
//! resolution at compile time and storage at execution time.
//!
//! Tables are B-trees keyed by row id. Indexes are sorted vectors of keys;
//! each key holds the indexed column values followed by the row id, so an
//! index scan yields rows sorted column by column.
//!
//! Writes through [`Storage`] require an exclusive write operation. Beginning
//! one snapshots the database; rollback restores the snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::core::{Error, Result, Row, Value};

use super::traits::{
    DbId, IndexDef, RootPage, Scanner, SchemaResolver, Storage, TableDef, VecScanner,
};

/// Name of the default database
pub const MAIN_DB_NAME: &str = "main";

/// Name of the session-local database
pub const TEMP_DB_NAME: &str = "temp";

#[derive(Debug, Clone)]
enum Tree {
    Table {
        rows: BTreeMap<i64, Row>,
        next_rowid: i64,
    },
    Index {
        entries: Arc<Vec<Row>>,
    },
}

#[derive(Debug, Clone)]
struct MemDatabase {
    name: String,
    tables: Vec<TableDef>,
    trees: FxHashMap<RootPage, Tree>,
    next_root: RootPage,
}

impl MemDatabase {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tables: Vec::new(),
            trees: FxHashMap::default(),
            // Page 1 is reserved for the schema
            next_root: 2,
        }
    }

    fn allocate_root(&mut self) -> RootPage {
        let root = self.next_root;
        self.next_root += 1;
        root
    }

    fn table(&self, name: &str) -> Option<&TableDef> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    fn table_by_root(&self, root: RootPage) -> Option<&TableDef> {
        self.tables.iter().find(|t| t.root == root)
    }

    fn create_table(&mut self, db: DbId, name: &str, columns: &[&str]) -> Result<RootPage> {
        if self.table(name).is_some() {
            return Err(Error::TableAlreadyExists(name.to_string()));
        }
        let root = self.allocate_root();
        self.trees.insert(
            root,
            Tree::Table {
                rows: BTreeMap::new(),
                next_rowid: 1,
            },
        );
        self.tables.push(TableDef {
            name: name.to_string(),
            db,
            root,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            indexes: Vec::new(),
        });
        Ok(root)
    }

    fn create_index(&mut self, table: &str, name: &str, columns: &[&str]) -> Result<RootPage> {
        if self
            .tables
            .iter()
            .flat_map(|t| t.indexes.iter())
            .any(|i| i.name.eq_ignore_ascii_case(name))
        {
            return Err(Error::internal(format!("index {} already exists", name)));
        }
        let table_def = self
            .table(table)
            .ok_or_else(|| Error::TableNotFound(table.to_string()))?;
        let positions = columns
            .iter()
            .map(|c| {
                table_def
                    .column_index(c)
                    .ok_or_else(|| Error::ColumnNotFound(c.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        if positions.is_empty() {
            return Err(Error::internal(format!("index {} has no columns", name)));
        }
        let table_root = table_def.root;

        let root = self.allocate_root();
        self.trees.insert(
            root,
            Tree::Index {
                entries: Arc::new(Vec::new()),
            },
        );
        if let Some(t) = self.tables.iter_mut().find(|t| t.root == table_root) {
            t.indexes.push(IndexDef {
                name: name.to_string(),
                root,
                columns: columns.iter().map(|c| c.to_string()).collect(),
            });
        }
        self.rebuild_indexes(table_root)?;
        Ok(root)
    }

    fn table_rows(&self, root: RootPage) -> Result<&BTreeMap<i64, Row>> {
        match self.trees.get(&root) {
            Some(Tree::Table { rows, .. }) => Ok(rows),
            _ => Err(Error::RootNotFound(root)),
        }
    }

    fn index_key(table: &TableDef, index: &IndexDef, rowid: i64, record: &Row) -> Row {
        let mut key: Row = index
            .columns
            .iter()
            .map(|c| {
                table
                    .column_index(c)
                    .and_then(|i| record.get(i).cloned())
                    .unwrap_or_default()
            })
            .collect();
        key.push(Value::Integer(rowid));
        key
    }

    fn insert_record(&mut self, root: RootPage, rowid: i64, record: Row) -> Result<()> {
        let table = self
            .table_by_root(root)
            .cloned()
            .ok_or(Error::RootNotFound(root))?;
        if record.len() != table.columns.len() {
            return Err(Error::TableColumnsNotMatch {
                expected: table.columns.len(),
                got: record.len(),
            });
        }

        for index in &table.indexes {
            let key = Self::index_key(&table, index, rowid, &record);
            if let Some(Tree::Index { entries }) = self.trees.get_mut(&index.root) {
                let entries = Arc::make_mut(entries);
                let pos = entries.binary_search(&key).unwrap_or_else(|p| p);
                entries.insert(pos, key);
            }
        }

        match self.trees.get_mut(&root) {
            Some(Tree::Table { rows, next_rowid }) => {
                rows.insert(rowid, record);
                *next_rowid = (*next_rowid).max(rowid.saturating_add(1));
                Ok(())
            }
            _ => Err(Error::RootNotFound(root)),
        }
    }

    fn rebuild_indexes(&mut self, root: RootPage) -> Result<()> {
        let table = self
            .table_by_root(root)
            .cloned()
            .ok_or(Error::RootNotFound(root))?;
        let rows = self.table_rows(root)?;
        let rebuilt: Vec<(RootPage, Vec<Row>)> = table
            .indexes
            .iter()
            .map(|index| {
                let mut keys: Vec<Row> = rows
                    .iter()
                    .map(|(rowid, record)| Self::index_key(&table, index, *rowid, record))
                    .collect();
                keys.sort();
                (index.root, keys)
            })
            .collect();
        for (index_root, keys) in rebuilt {
            self.trees.insert(
                index_root,
                Tree::Index {
                    entries: Arc::new(keys),
                },
            );
        }
        Ok(())
    }
}

/// MemoryEngine holds attached databases in memory
#[derive(Debug)]
pub struct MemoryEngine {
    databases: Vec<MemDatabase>,
    /// Pre-write snapshots of the databases with an open write operation
    pending: FxHashMap<DbId, MemDatabase>,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    /// Creates an engine with the `main` and `temp` databases attached
    pub fn new() -> Self {
        Self {
            databases: vec![
                MemDatabase::new(MAIN_DB_NAME),
                MemDatabase::new(TEMP_DB_NAME),
            ],
            pending: FxHashMap::default(),
        }
    }

    /// Attaches an empty database under a new name
    pub fn attach(&mut self, name: &str) -> Result<DbId> {
        if self.find_database(name).is_some() {
            return Err(Error::internal(format!("database {} is already in use", name)));
        }
        self.databases.push(MemDatabase::new(name));
        Ok(self.databases.len() - 1)
    }

    fn database(&self, db: DbId) -> Result<&MemDatabase> {
        self.databases
            .get(db)
            .ok_or_else(|| Error::DatabaseNotFound(db.to_string()))
    }

    fn database_mut(&mut self, db: DbId) -> Result<&mut MemDatabase> {
        self.databases
            .get_mut(db)
            .ok_or_else(|| Error::DatabaseNotFound(db.to_string()))
    }

    fn writable(&mut self, db: DbId) -> Result<&mut MemDatabase> {
        if !self.pending.contains_key(&db) {
            return Err(Error::TransactionNotStarted);
        }
        self.database_mut(db)
    }

    /// Creates a table outside of any write operation
    pub fn define_table(&mut self, db: DbId, name: &str, columns: &[&str]) -> Result<RootPage> {
        self.database_mut(db)?.create_table(db, name, columns)
    }

    /// Creates an index and fills it from the table's rows
    pub fn define_index(
        &mut self,
        db: DbId,
        table: &str,
        name: &str,
        columns: &[&str],
    ) -> Result<RootPage> {
        self.database_mut(db)?.create_index(table, name, columns)
    }

    /// Inserts a row, maintaining every index of the table
    pub fn insert_row(&mut self, db: DbId, table: &str, values: Vec<Value>) -> Result<i64> {
        let database = self.database_mut(db)?;
        let root = database
            .table(table)
            .map(|t| t.root)
            .ok_or_else(|| Error::TableNotFound(table.to_string()))?;
        let rowid = match database.trees.get(&root) {
            Some(Tree::Table { next_rowid, .. }) => *next_rowid,
            _ => return Err(Error::RootNotFound(root)),
        };
        database.insert_record(root, rowid, Row::from_values(values))?;
        Ok(rowid)
    }

    /// Returns the records of a table in row id order
    pub fn table_rows(&self, db: DbId, table: &str) -> Result<Vec<Row>> {
        let database = self.database(db)?;
        let root = database
            .table(table)
            .map(|t| t.root)
            .ok_or_else(|| Error::TableNotFound(table.to_string()))?;
        Ok(database.table_rows(root)?.values().cloned().collect())
    }
}

impl SchemaResolver for MemoryEngine {
    fn database_count(&self) -> usize {
        self.databases.len()
    }

    fn database_name(&self, db: DbId) -> Option<&str> {
        self.databases.get(db).map(|d| d.name.as_str())
    }

    fn find_database(&self, name: &str) -> Option<DbId> {
        self.databases
            .iter()
            .position(|d| d.name.eq_ignore_ascii_case(name))
    }

    fn find_table(&self, name: &str, db: DbId) -> Option<&TableDef> {
        self.databases.get(db).and_then(|d| d.table(name))
    }

    fn tables(&self, db: DbId) -> Vec<&TableDef> {
        self.databases
            .get(db)
            .map(|d| d.tables.iter().collect())
            .unwrap_or_default()
    }
}

impl Storage for MemoryEngine {
    fn begin_write(&mut self, db: DbId) -> Result<()> {
        if !self.pending.contains_key(&db) {
            let snapshot = self.database(db)?.clone();
            self.pending.insert(db, snapshot);
        }
        Ok(())
    }

    fn in_write(&self, db: DbId) -> bool {
        self.pending.contains_key(&db)
    }

    fn commit(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Err(Error::TransactionNotStarted);
        }
        self.pending.clear();
        Ok(())
    }

    fn rollback(&mut self) {
        for (db, snapshot) in self.pending.drain() {
            if let Some(slot) = self.databases.get_mut(db) {
                *slot = snapshot;
            }
        }
    }

    fn create_table(&mut self, db: DbId, name: &str, columns: &[&str]) -> Result<RootPage> {
        self.writable(db)?.create_table(db, name, columns)
    }

    fn delete_matching(
        &mut self,
        db: DbId,
        root: RootPage,
        column: usize,
        value: &Value,
    ) -> Result<usize> {
        let database = self.writable(db)?;
        let removed = match database.trees.get_mut(&root) {
            Some(Tree::Table { rows, .. }) => {
                let before = rows.len();
                rows.retain(|_, record| record.get(column) != Some(value));
                before - rows.len()
            }
            _ => return Err(Error::RootNotFound(root)),
        };
        if removed > 0 {
            database.rebuild_indexes(root)?;
        }
        Ok(removed)
    }

    fn clear(&mut self, db: DbId, root: RootPage) -> Result<()> {
        let database = self.writable(db)?;
        match database.trees.get_mut(&root) {
            Some(Tree::Table { rows, .. }) => rows.clear(),
            _ => return Err(Error::RootNotFound(root)),
        }
        database.rebuild_indexes(root)
    }

    fn open_scan(&self, db: DbId, root: RootPage) -> Result<Box<dyn Scanner>> {
        let rows = match self.database(db)?.trees.get(&root) {
            Some(Tree::Index { entries }) => Arc::clone(entries),
            Some(Tree::Table { rows, .. }) => Arc::new(rows.values().cloned().collect()),
            None => return Err(Error::RootNotFound(root)),
        };
        Ok(Box::new(VecScanner::new(rows)))
    }

    fn new_rowid(&mut self, db: DbId, root: RootPage) -> Result<i64> {
        match self.writable(db)?.trees.get_mut(&root) {
            Some(Tree::Table { next_rowid, .. }) => {
                let rowid = *next_rowid;
                *next_rowid += 1;
                Ok(rowid)
            }
            _ => Err(Error::RootNotFound(root)),
        }
    }

    fn insert(&mut self, db: DbId, root: RootPage, rowid: i64, record: Row) -> Result<()> {
        self.writable(db)?.insert_record(root, rowid, record)
    }
}
