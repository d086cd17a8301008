//! Batch run configuration.
//!
//! # Responsibility
//! - Collect the knobs of one run: store location, pool size, retry policy.
//! - Reject settings that would make a run meaningless before any I/O.
//!
//! # Invariants
//! - `worker_count >= 1` and `retry.max_attempts >= 1` after `validate()`.

use crate::db::{ConnectionOptions, DEFAULT_BUSY_TIMEOUT};
use crate::model::record::EntityKind;
use crate::service::insertion::DEFAULT_WORKER_COUNT;
use crate::service::retry::RetryPolicy;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default directory holding the three store files.
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroWorkers,
    ZeroAttempts,
    ZeroBackoffMultiplier,
    EmptyDataDir,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroWorkers => f.write_str("worker_count must be at least 1"),
            Self::ZeroAttempts => f.write_str("retry max_attempts must be at least 1"),
            Self::ZeroBackoffMultiplier => f.write_str("retry multiplier must be at least 1"),
            Self::EmptyDataDir => f.write_str("data_dir cannot be empty"),
        }
    }
}

impl Error for ConfigError {}

/// Settings for one batch run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchConfig {
    /// Directory containing `users.db`, `products.db` and `orders.db`.
    pub data_dir: PathBuf,
    /// Concurrent inserts per phase.
    pub worker_count: usize,
    pub retry: RetryPolicy,
    /// SQLite-level wait on a locked store before it reports busy.
    pub busy_timeout: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            worker_count: DEFAULT_WORKER_COUNT,
            retry: RetryPolicy::default(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl BatchConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    /// Checks settings before stores are opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        if self.worker_count == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if self.retry.multiplier == 0 {
            return Err(ConfigError::ZeroBackoffMultiplier);
        }
        Ok(())
    }

    pub fn connection_options(&self) -> ConnectionOptions {
        ConnectionOptions {
            busy_timeout: self.busy_timeout,
        }
    }

    /// Path of the store file for `kind` under `data_dir`.
    pub fn store_path(&self, kind: EntityKind) -> PathBuf {
        store_path_in(&self.data_dir, kind)
    }
}

fn store_path_in(dir: &Path, kind: EntityKind) -> PathBuf {
    dir.join(kind.store_file_name())
}
