use multidb_core::{
    load_batch_file, BatchConfig, BatchError, BatchRunner, BatchStores, EntityKind,
    InsertionEngine, OrderRecord, ProductRecord, RecordBatch, RecordStore, RetryPolicy,
    SkippedRecord, StoreError, StoreResult, UserRecord,
};
use rusqlite::Connection;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn skipped(id: i64, reasons: &[&str]) -> SkippedRecord {
    SkippedRecord {
        id,
        reasons: reasons.iter().map(|reason| reason.to_string()).collect(),
    }
}

fn row_count(dir: &Path, kind: EntityKind) -> i64 {
    let conn = Connection::open(dir.join(kind.store_file_name())).unwrap();
    conn.query_row(
        &format!("SELECT COUNT(*) FROM {};", kind.as_str()),
        [],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn sample_batch_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let runner = BatchRunner::from_config(&BatchConfig::new(dir.path())).unwrap();

    let report = runner.run(&RecordBatch::sample());

    assert_eq!(report.users.inserted_count, 8);
    assert_eq!(report.users.skipped_count, 2);
    assert_eq!(
        report.users.skipped_details,
        vec![
            skipped(8, &["duplicate email"]),
            skipped(10, &["missing name"]),
        ]
    );

    assert_eq!(report.products.inserted_count, 9);
    assert_eq!(report.products.skipped_count, 1);
    assert_eq!(
        report.products.skipped_details,
        vec![skipped(10, &["price must be > 0"])]
    );

    assert_eq!(report.orders.inserted_count, 7);
    assert_eq!(report.orders.skipped_count, 3);
    assert_eq!(
        report.orders.skipped_details,
        vec![
            skipped(8, &["quantity must be > 0", "user_id 8 not found"]),
            skipped(9, &["quantity must be > 0"]),
            skipped(10, &["user_id 10 not found", "product_id 11 not found"]),
        ]
    );

    assert!(!report.has_failures());
    assert_eq!(row_count(dir.path(), EntityKind::Users), 8);
    assert_eq!(row_count(dir.path(), EntityKind::Products), 9);
    assert_eq!(row_count(dir.path(), EntityKind::Orders), 7);
}

#[test]
fn rerunning_the_same_batch_reports_primary_key_failures() {
    let dir = tempfile::tempdir().unwrap();
    let config = BatchConfig::new(dir.path()).with_retry(RetryPolicy::no_retry());

    BatchRunner::from_config(&config)
        .unwrap()
        .run(&RecordBatch::sample());
    let second = BatchRunner::from_config(&config)
        .unwrap()
        .run(&RecordBatch::sample());

    assert_eq!(second.users.inserted_count, 0);
    assert_eq!(second.users.failed_count, 8);
    assert!(second
        .users
        .failed_details
        .iter()
        .all(|failed| matches!(failed.error, StoreError::Permanent(_))));
    assert_eq!(second.users.skipped_count, 2);
    assert_eq!(row_count(dir.path(), EntityKind::Users), 8);
}

/// Records phase boundaries: which entity kind each insert call belonged to.
#[derive(Default)]
struct PhaseLog {
    events: Mutex<Vec<EntityKind>>,
}

struct LoggingStore {
    kind: EntityKind,
    log: Arc<PhaseLog>,
    calls: AtomicUsize,
}

impl LoggingStore {
    fn new(kind: EntityKind, log: Arc<PhaseLog>) -> Self {
        Self {
            kind,
            log,
            calls: AtomicUsize::new(0),
        }
    }

    fn record(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(1));
        self.log.events.lock().unwrap().push(self.kind);
        Ok(())
    }
}

impl RecordStore<UserRecord> for LoggingStore {
    fn insert(&self, _record: &UserRecord) -> StoreResult<()> {
        self.record()
    }
}

impl RecordStore<ProductRecord> for LoggingStore {
    fn insert(&self, _record: &ProductRecord) -> StoreResult<()> {
        self.record()
    }
}

impl RecordStore<OrderRecord> for LoggingStore {
    fn insert(&self, _record: &OrderRecord) -> StoreResult<()> {
        self.record()
    }
}

#[test]
fn phases_run_strictly_in_entity_order() {
    let log = Arc::new(PhaseLog::default());
    let users = Arc::new(LoggingStore::new(EntityKind::Users, Arc::clone(&log)));
    let products = Arc::new(LoggingStore::new(EntityKind::Products, Arc::clone(&log)));
    let orders = Arc::new(LoggingStore::new(EntityKind::Orders, Arc::clone(&log)));
    let stores = BatchStores {
        users: users.clone(),
        products: products.clone(),
        orders: orders.clone(),
    };
    let runner = BatchRunner::new(
        InsertionEngine::new(10, RetryPolicy::default()).unwrap(),
        stores,
    );

    let report = runner.run(&RecordBatch::sample());

    let events = log.events.lock().unwrap().clone();
    assert_eq!(events.len(), 8 + 9 + 7);
    let mut sorted = events.clone();
    sorted.sort();
    assert_eq!(events, sorted, "a later phase started before an earlier one joined");
    assert_eq!(users.calls.load(Ordering::SeqCst), 8);
    assert_eq!(products.calls.load(Ordering::SeqCst), 9);
    assert_eq!(orders.calls.load(Ordering::SeqCst), 7);
    assert_eq!(report.total_inserted(), 24);
}

#[test]
fn malformed_batch_file_fails_before_validation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch.json");
    std::fs::write(&path, r#"{"users": [{"name": "no id"}]}"#).unwrap();

    let err = load_batch_file(&path).unwrap_err();

    assert!(matches!(err, BatchError::MalformedInput(_)));
}

#[test]
fn batch_file_with_missing_optional_fields_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch.json");
    std::fs::write(
        &path,
        r#"{
            "users": [{"id": 1, "email": "a@b.co"}],
            "products": [{"id": 1, "name": "Pen", "price": 1.5}]
        }"#,
    )
    .unwrap();

    let batch = load_batch_file(&path).unwrap();

    assert_eq!(batch.users[0].name, "");
    assert!(batch.orders.is_empty());
}

#[test]
fn missing_batch_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = load_batch_file(dir.path().join("absent.json")).unwrap_err();

    assert!(matches!(err, BatchError::Io(_)));
}

#[test]
fn invalid_config_aborts_before_opening_stores() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("never-created");

    let result = BatchRunner::from_config(&BatchConfig::new(&data_dir).with_worker_count(0));

    assert!(matches!(result, Err(BatchError::Config(_))));
    assert!(!data_dir.exists());
}
