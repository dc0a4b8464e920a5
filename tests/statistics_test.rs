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

//! Tests for the ANALYZE command and the statistics catalog table

use statcomp::api::Database;
use statcomp::{Error, StatRecord, Value};

fn setup_orders() -> Database {
    let db = Database::open_in_memory().expect("Failed to create database");
    db.create_table("orders", &["customer", "day", "amount"])
        .expect("Failed to create table");
    db.create_index("orders", "orders_customer", &["customer"])
        .expect("Failed to create index");
    db.create_index("orders", "orders_customer_day", &["customer", "day"])
        .expect("Failed to create index");
    db
}

fn insert(db: &Database, table: &str, values: &[i64]) {
    db.insert(table, values.iter().map(|v| Value::integer(*v)).collect())
        .expect("Insert failed");
}

fn sorted_stats(db: &Database, database: &str) -> Vec<StatRecord> {
    let mut rows = db.stat_rows(database).expect("Failed to read stats");
    rows.sort_by(|a, b| (&a.table, &a.index).cmp(&(&b.table, &b.index)));
    rows
}

/// Test the composite index example: four rows over two customers
#[test]
fn test_analyze_composite_index() {
    let db = Database::open_in_memory().expect("Failed to create database");
    db.create_table("t1", &["a", "b"]).unwrap();
    db.create_index("t1", "t1_b", &["b"]).unwrap();
    db.create_index("t1", "t1_ab", &["a", "b"]).unwrap();
    for (a, b) in [(1, 1), (1, 2), (1, 2), (2, 1)] {
        insert(&db, "t1", &[a, b]);
    }

    db.analyze("ANALYZE").expect("ANALYZE failed");

    assert_eq!(
        sorted_stats(&db, "main"),
        vec![
            StatRecord::new("t1", "t1_ab", "2 2"),
            StatRecord::new("t1", "t1_b", "2"),
        ]
    );
}

/// Test that the catalog table is created on first use
#[test]
fn test_analyze_creates_stat_table() {
    let db = setup_orders();
    insert(&db, "orders", &[1, 1, 10]);

    assert!(db.table_rows("sqlite_stat1").is_err());
    db.analyze("ANALYZE orders").expect("ANALYZE failed");

    let rows = db.table_rows("sqlite_stat1").expect("stat table missing");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].len(), 3);
}

/// Test that a table with a single index is not analyzed
#[test]
fn test_single_index_table_produces_no_row() {
    let db = Database::open_in_memory().unwrap();
    db.create_table("lonely", &["a"]).unwrap();
    db.create_index("lonely", "lonely_a", &["a"]).unwrap();
    insert(&db, "lonely", &[1]);

    db.analyze("ANALYZE").expect("ANALYZE failed");
    assert!(db.stat_rows("main").unwrap().is_empty());
    // The catalog table still exists
    assert!(db.table_rows("sqlite_stat1").unwrap().is_empty());
}

/// Test that an empty index writes nothing
#[test]
fn test_empty_indexes_write_nothing() {
    let db = setup_orders();
    let summary = db.analyze("ANALYZE orders").expect("ANALYZE failed");
    assert_eq!(summary.rows_written, 0);
    assert!(db.stat_rows("main").unwrap().is_empty());
}

/// Test that NULL keys never compare equal
#[test]
fn test_null_keys_are_distinct() {
    let db = setup_orders();
    for customer in [Value::Null, Value::Null, Value::integer(1)] {
        db.insert("orders", vec![customer, Value::integer(1), Value::integer(0)])
            .unwrap();
    }
    db.analyze("ANALYZE orders").unwrap();

    let stats = sorted_stats(&db, "main");
    assert_eq!(stats[0], StatRecord::new("orders", "orders_customer", "1"));
    assert_eq!(
        stats[1],
        StatRecord::new("orders", "orders_customer_day", "1 1")
    );
}

/// Test that running ANALYZE twice gives the same catalog contents
#[test]
fn test_analyze_is_idempotent() {
    let db = setup_orders();
    for i in 0..20 {
        insert(&db, "orders", &[i % 4, i % 7, i]);
    }

    db.analyze("ANALYZE").unwrap();
    let first = sorted_stats(&db, "main");
    let summary = db.analyze("ANALYZE").unwrap();
    let second = sorted_stats(&db, "main");

    assert_eq!(first, second);
    assert_eq!(summary.rows_written, 2);

    db.analyze("ANALYZE orders").unwrap();
    assert_eq!(sorted_stats(&db, "main"), first);
}

/// Test that analyzing one table leaves the rows of other tables alone
#[test]
fn test_table_scope_keeps_other_rows() {
    let db = setup_orders();
    db.create_table("items", &["sku", "color"]).unwrap();
    db.create_index("items", "items_sku", &["sku"]).unwrap();
    db.create_index("items", "items_color", &["color"]).unwrap();
    insert(&db, "orders", &[1, 1, 1]);
    insert(&db, "items", &[1, 1]);
    insert(&db, "items", &[2, 1]);

    db.analyze("ANALYZE").unwrap();
    assert_eq!(db.stat_rows("main").unwrap().len(), 4);

    insert(&db, "items", &[3, 2]);
    let summary = db.analyze("ANALYZE items").unwrap();
    assert_eq!(summary.rows_deleted, 2);
    assert_eq!(summary.rows_written, 2);

    let stats = sorted_stats(&db, "main");
    assert_eq!(stats.len(), 4);
    assert!(stats.contains(&StatRecord::new("items", "items_color", "2")));
    assert!(stats.contains(&StatRecord::new("items", "items_sku", "1")));
    assert!(stats.contains(&StatRecord::new("orders", "orders_customer", "1")));
}

/// Test that the temp database is only analyzed when named
#[test]
fn test_temp_database_is_skipped_by_default() {
    let db = Database::open_in_memory().unwrap();
    db.create_table("temp.scratch", &["a", "b"]).unwrap();
    db.create_index("temp.scratch", "scratch_a", &["a"]).unwrap();
    db.create_index("temp.scratch", "scratch_b", &["b"]).unwrap();
    insert(&db, "temp.scratch", &[1, 2]);

    db.analyze("ANALYZE").unwrap();
    assert!(db.stat_rows("temp").unwrap().is_empty());

    db.analyze("ANALYZE temp").unwrap();
    assert_eq!(db.stat_rows("temp").unwrap().len(), 2);
}

/// Test that each attached database gets its own catalog table
#[test]
fn test_attached_databases_are_isolated() {
    let db = setup_orders();
    db.attach("aux").unwrap();
    db.create_table("aux.orders", &["customer"]).unwrap();
    db.create_index("aux.orders", "aux_c1", &["customer"]).unwrap();
    db.create_index("aux.orders", "aux_c2", &["customer"]).unwrap();
    insert(&db, "orders", &[1, 1, 1]);
    insert(&db, "aux.orders", &[5]);
    insert(&db, "aux.orders", &[5]);

    db.analyze("ANALYZE aux.orders").unwrap();
    assert!(db.stat_rows("main").unwrap().is_empty());
    assert_eq!(
        sorted_stats(&db, "aux"),
        vec![
            StatRecord::new("orders", "aux_c1", "2"),
            StatRecord::new("orders", "aux_c2", "2"),
        ]
    );

    db.analyze("ANALYZE").unwrap();
    assert_eq!(db.stat_rows("main").unwrap().len(), 2);
    assert_eq!(db.stat_rows("aux").unwrap().len(), 2);
}

/// Test name resolution failures
#[test]
fn test_name_resolution_errors() {
    let db = setup_orders();
    assert!(matches!(
        db.analyze("ANALYZE missing").unwrap_err(),
        Error::TableNotFound(_)
    ));
    assert!(matches!(
        db.analyze("ANALYZE nodb.orders").unwrap_err(),
        Error::DatabaseNotFound(_)
    ));
    assert!(matches!(
        db.analyze("ANALYZE main.missing").unwrap_err(),
        Error::TableNotFound(_)
    ));
    assert!(matches!(
        db.analyze("ANALYZE main.orders.x").unwrap_err(),
        Error::Parse(_)
    ));
}

/// Test that a malformed existing catalog table fails compilation
#[test]
fn test_malformed_stat_table_is_rejected() {
    let db = setup_orders();
    db.create_table("sqlite_stat1", &["tbl", "idx"]).unwrap();
    insert(&db, "orders", &[1, 1, 1]);

    let err = db.analyze("ANALYZE").unwrap_err();
    assert!(matches!(err, Error::CatalogPrepare { .. }));
    assert!(db.table_rows("sqlite_stat1").unwrap().is_empty());
}

/// Test that persisted stat strings parse back into estimates
#[test]
fn test_estimates_round_trip_through_catalog() {
    let db = setup_orders();
    for i in 0..10 {
        insert(&db, "orders", &[i % 3, i % 5, i]);
    }
    db.analyze("ANALYZE orders").unwrap();

    for record in db.stat_rows("main").unwrap() {
        let estimates = record.estimates().expect("malformed stat string");
        match record.index.as_str() {
            "orders_customer" => assert_eq!(estimates, vec![4]),
            "orders_customer_day" => assert_eq!(estimates, vec![4, 1]),
            other => panic!("unexpected index {}", other),
        }
    }
}
