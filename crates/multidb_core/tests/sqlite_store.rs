use multidb_core::db::migrations::latest_version;
use multidb_core::db::{open_store_db, open_store_db_in_memory, ConnectionOptions, DbError};
use multidb_core::{
    Decimal, EntityKind, InsertionEngine, OrderRecord, ProductRecord, RecordStore, RetryPolicy,
    SqliteRecordStore, StoreError, Transient, UserRecord,
};
use rusqlite::Connection;
use std::str::FromStr;
use std::time::Duration;

fn no_wait() -> ConnectionOptions {
    ConnectionOptions {
        busy_timeout: Duration::ZERO,
    }
}

#[test]
fn each_store_bootstraps_only_its_own_table() {
    for kind in EntityKind::ALL {
        let conn = open_store_db_in_memory(kind).unwrap();
        assert_eq!(schema_version(&conn), latest_version(kind));
        for other in EntityKind::ALL {
            assert_eq!(
                table_exists(&conn, other.as_str()),
                other == kind,
                "{kind} store and table {other}"
            );
        }
    }
}

#[test]
fn reopening_a_store_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.db");

    let first = open_store_db(&path, EntityKind::Users, &ConnectionOptions::default()).unwrap();
    drop(first);
    let second = open_store_db(&path, EntityKind::Users, &ConnectionOptions::default()).unwrap();

    assert_eq!(schema_version(&second), latest_version(EntityKind::Users));
}

#[test]
fn newer_schema_version_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_store_db(&path, EntityKind::Orders, &ConnectionOptions::default()).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            kind, db_version, ..
        } => {
            assert_eq!(kind, EntityKind::Orders);
            assert_eq!(db_version, 999);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn inserts_land_in_the_entity_store() {
    let dir = tempfile::tempdir().unwrap();
    let store =
        SqliteRecordStore::<ProductRecord>::open(dir.path().join("products.db"), no_wait(), 4)
            .unwrap();

    store
        .insert(&ProductRecord::new(
            1,
            "Laptop",
            Decimal::from_str("1000.00").unwrap(),
        ))
        .unwrap();

    assert_eq!(store.count().unwrap(), 1);
    let conn = Connection::open(dir.path().join("products.db")).unwrap();
    let price: String = conn
        .query_row("SELECT price FROM products WHERE id = 1;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(price, "1000.00");
}

#[test]
fn duplicate_primary_key_is_a_permanent_error() {
    let dir = tempfile::tempdir().unwrap();
    let store =
        SqliteRecordStore::<UserRecord>::open(dir.path().join("users.db"), no_wait(), 2).unwrap();
    let user = UserRecord::new(1, "Alice", "alice@example.com");

    store.insert(&user).unwrap();
    let err = store.insert(&user).unwrap_err();

    assert!(matches!(err, StoreError::Permanent(_)));
    assert!(!err.is_transient());
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn locked_store_reports_busy() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.db");
    let store = SqliteRecordStore::<OrderRecord>::open(&path, no_wait(), 2).unwrap();

    let blocker = Connection::open(&path).unwrap();
    blocker.execute_batch("BEGIN EXCLUSIVE;").unwrap();

    let err = store.insert(&OrderRecord::new(1, 1, 1, 2)).unwrap_err();
    assert!(matches!(err, StoreError::Busy(_)), "got {err:?}");

    blocker.execute_batch("ROLLBACK;").unwrap();
    store.insert(&OrderRecord::new(1, 1, 1, 2)).unwrap();
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn concurrent_inserts_into_one_store_all_commit() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteRecordStore::<UserRecord>::open(
        dir.path().join("users.db"),
        ConnectionOptions::default(),
        10,
    )
    .unwrap();
    let engine = InsertionEngine::new(10, RetryPolicy::default()).unwrap();
    let records: Vec<UserRecord> = (1..=50)
        .map(|id| UserRecord::new(id, format!("user{id}"), format!("user{id}@example.com")))
        .collect();

    let outcomes = engine.insert_all(&records, &store);

    assert!(outcomes.iter().all(|outcome| outcome.succeeded()));
    assert_eq!(store.count().unwrap(), 50);
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn table_exists(conn: &Connection, table_name: &str) -> bool {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    exists == 1
}
