//! Batch orchestration: validate, insert per store, report.
//!
//! # Responsibility
//! - Validate users, products and orders (orders against the valid sets).
//! - Run the insertion phases strictly in order: users, products, orders.
//! - Summarize every phase into a `BatchReport`.
//!
//! # Invariants
//! - A phase starts only after the previous phase fully joined.
//! - Per-record failures end up in the report; only setup errors abort a run.
//! - Each entity kind is written only to its own store.

use crate::config::{BatchConfig, ConfigError};
use crate::db::DbError;
use crate::model::batch::RecordBatch;
use crate::model::record::{EntityKind, OrderRecord, ProductRecord, RecordId, UserRecord};
use crate::repo::record_store::RecordStore;
use crate::repo::sqlite_store::SqliteRecordStore;
use crate::service::insertion::InsertionEngine;
use crate::service::report::{summarize, BatchReport};
use crate::validation::{validate_orders, validate_products, validate_users};
use log::{error, info};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

pub type BatchResult<T> = Result<T, BatchError>;

/// Failures that stop a run before any record is validated.
#[derive(Debug)]
pub enum BatchError {
    MalformedInput(serde_json::Error),
    Io(std::io::Error),
    Config(ConfigError),
    Db(DbError),
    WorkerPool(String),
}

impl Display for BatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedInput(err) => write!(f, "malformed input batch: {err}"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "invalid configuration: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::WorkerPool(message) => write!(f, "failed to start worker pool: {message}"),
        }
    }
}

impl Error for BatchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedInput(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::WorkerPool(_) => None,
        }
    }
}

impl From<serde_json::Error> for BatchError {
    fn from(value: serde_json::Error) -> Self {
        Self::MalformedInput(value)
    }
}

impl From<std::io::Error> for BatchError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ConfigError> for BatchError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for BatchError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Reads and parses a JSON batch file.
pub fn load_batch_file(path: impl AsRef<Path>) -> BatchResult<RecordBatch> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    match RecordBatch::from_json_str(&json) {
        Ok(batch) => Ok(batch),
        Err(err) => {
            error!(
                "event=batch_load module=batch status=error path={} error={}",
                path.display(),
                err
            );
            Err(err.into())
        }
    }
}

/// One store per entity kind.
#[derive(Clone)]
pub struct BatchStores {
    pub users: Arc<dyn RecordStore<UserRecord>>,
    pub products: Arc<dyn RecordStore<ProductRecord>>,
    pub orders: Arc<dyn RecordStore<OrderRecord>>,
}

/// Opens the three SQLite stores under `config.data_dir`, creating it if needed.
pub fn open_sqlite_stores(config: &BatchConfig) -> BatchResult<BatchStores> {
    config.validate()?;
    std::fs::create_dir_all(&config.data_dir)?;

    let options = config.connection_options();
    let max_connections = config.worker_count;
    let users = SqliteRecordStore::<UserRecord>::open(
        config.store_path(EntityKind::Users),
        options,
        max_connections,
    )?;
    let products = SqliteRecordStore::<ProductRecord>::open(
        config.store_path(EntityKind::Products),
        options,
        max_connections,
    )?;
    let orders = SqliteRecordStore::<OrderRecord>::open(
        config.store_path(EntityKind::Orders),
        options,
        max_connections,
    )?;

    Ok(BatchStores {
        users: Arc::new(users),
        products: Arc::new(products),
        orders: Arc::new(orders),
    })
}

/// Runs validate → insert → report for a whole batch.
pub struct BatchRunner {
    engine: InsertionEngine,
    stores: BatchStores,
}

impl BatchRunner {
    pub fn new(engine: InsertionEngine, stores: BatchStores) -> Self {
        Self { engine, stores }
    }

    /// Builds the engine from `config` and opens SQLite stores under its data dir.
    pub fn from_config(config: &BatchConfig) -> BatchResult<Self> {
        let stores = open_sqlite_stores(config)?;
        let engine = InsertionEngine::new(config.worker_count, config.retry)
            .map_err(|err| BatchError::WorkerPool(err.to_string()))?;
        Ok(Self::new(engine, stores))
    }

    pub fn engine(&self) -> &InsertionEngine {
        &self.engine
    }

    /// Processes `batch` and returns per-entity reports.
    ///
    /// Never fails because of individual records: rejections and store
    /// failures are reported, not raised.
    pub fn run(&self, batch: &RecordBatch) -> BatchReport {
        let started_at = Instant::now();
        info!(
            "event=batch_run module=batch status=start users={} products={} orders={}",
            batch.users.len(),
            batch.products.len(),
            batch.orders.len()
        );

        let users = validate_users(&batch.users);
        let products = validate_products(&batch.products);
        let valid_user_ids: HashSet<RecordId> = users.valid.iter().map(|user| user.id).collect();
        let valid_product_ids: HashSet<RecordId> =
            products.valid.iter().map(|product| product.id).collect();
        let orders = validate_orders(&batch.orders, &valid_user_ids, &valid_product_ids);

        let user_outcomes = self.engine.insert_all(&users.valid, self.stores.users.as_ref());
        let product_outcomes = self
            .engine
            .insert_all(&products.valid, self.stores.products.as_ref());
        let order_outcomes = self
            .engine
            .insert_all(&orders.valid, self.stores.orders.as_ref());

        let report = BatchReport {
            users: summarize(&user_outcomes, &users.rejected),
            products: summarize(&product_outcomes, &products.rejected),
            orders: summarize(&order_outcomes, &orders.rejected),
        };

        info!(
            "event=batch_run module=batch status=ok inserted={} failures={} duration_ms={}",
            report.total_inserted(),
            report.has_failures(),
            started_at.elapsed().as_millis()
        );
        report
    }
}
