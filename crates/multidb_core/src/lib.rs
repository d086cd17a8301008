//! Core logic for the multi-store batch inserter.
//!
//! Validates a batch of users, products and orders, inserts every valid
//! record into its entity's own SQLite store through a bounded worker pool
//! with busy-retry, and reports what was inserted or skipped.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use config::{BatchConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig};
pub use model::batch::RecordBatch;
pub use model::record::{EntityKind, OrderRecord, ProductRecord, Record, RecordId, UserRecord};
pub use rust_decimal::Decimal;
pub use repo::record_store::{RecordStore, StoreError, StoreResult};
pub use repo::sqlite_store::{SqliteRecordStore, SqliteRow};
pub use service::batch_runner::{
    load_batch_file, open_sqlite_stores, BatchError, BatchResult, BatchRunner, BatchStores,
};
pub use service::insertion::{InsertionEngine, InsertionOutcome, DEFAULT_WORKER_COUNT};
pub use service::report::{summarize, BatchReport, EntityReport, FailedRecord, SkippedRecord};
pub use service::retry::{Retried, RetryPolicy, Transient};
pub use validation::{
    validate_orders, validate_products, validate_users, Rejection, RejectionReason, Validated,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
