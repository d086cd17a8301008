//! Record store contract and error taxonomy.

use crate::db::DbError;
use crate::service::retry::Transient;
use rusqlite::ErrorCode;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of one single-record store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum StoreError {
    /// The store is locked by another writer; retrying may succeed.
    Busy(String),
    /// Constraint violation, I/O or any other failure retries cannot fix.
    Permanent(String),
}

impl StoreError {
    pub fn message(&self) -> &str {
        match self {
            Self::Busy(message) | Self::Permanent(message) => message,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy(message) => write!(f, "store busy: {message}"),
            Self::Permanent(message) => write!(f, "store error: {message}"),
        }
    }
}

impl Error for StoreError {}

impl Transient for StoreError {
    fn is_transient(&self) -> bool {
        matches!(self, Self::Busy(_))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        match value.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
                Self::Busy(value.to_string())
            }
            _ => Self::Permanent(value.to_string()),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        match value {
            DbError::Sqlite(err) => err.into(),
            other => Self::Permanent(other.to_string()),
        }
    }
}

/// Single-record insert contract for one entity store.
///
/// Implementations must tolerate concurrent calls from a worker pool.
pub trait RecordStore<R>: Send + Sync {
    /// Inserts one record atomically.
    ///
    /// # Errors
    /// - `StoreError::Busy` when the store is locked and the call may be retried.
    /// - `StoreError::Permanent` for every other failure.
    fn insert(&self, record: &R) -> StoreResult<()>;
}
