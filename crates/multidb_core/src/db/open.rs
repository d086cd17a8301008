//! Connection bootstrap utilities for entity stores.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections for one entity kind.
//! - Configure connection pragmas required by insertion behavior.
//! - Trigger the store's schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Every returned connection has the configured `busy_timeout`.
//! - `open_store_db*` connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use crate::model::record::EntityKind;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Default time SQLite waits on a locked store before reporting busy.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-connection settings shared by every connection of one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionOptions {
    /// How long SQLite itself blocks on a lock before returning `SQLITE_BUSY`.
    ///
    /// Zero hands contention straight back to the caller's retry policy.
    pub busy_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

/// Opens the store file for `kind` and applies all pending migrations.
///
/// # Side effects
/// - Creates the database file when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_store_db(
    path: impl AsRef<Path>,
    kind: EntityKind,
    options: &ConnectionOptions,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file store={kind}");

    let mut conn = match open_connection(path.as_ref(), options) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode=file store={} duration_ms={} error_code=db_open_failed error={}",
                kind,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    finish_bootstrap(&mut conn, kind, "file", started_at)?;
    Ok(conn)
}

/// Opens a private in-memory store for `kind` and applies all pending migrations.
///
/// The database disappears with the connection, so it cannot back a pool.
pub fn open_store_db_in_memory(kind: EntityKind) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory store={kind}");

    let mut conn = Connection::open_in_memory()?;
    finish_bootstrap(&mut conn, kind, "memory", started_at)?;
    Ok(conn)
}

/// Opens one configured connection without running migrations.
pub(crate) fn open_connection(
    path: &Path,
    options: &ConnectionOptions,
) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(options.busy_timeout)?;
    Ok(conn)
}

fn finish_bootstrap(
    conn: &mut Connection,
    kind: EntityKind,
    mode: &str,
    started_at: Instant,
) -> DbResult<()> {
    match apply_migrations(conn, kind) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} store={} duration_ms={}",
                mode,
                kind,
                started_at.elapsed().as_millis()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} store={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                kind,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}
