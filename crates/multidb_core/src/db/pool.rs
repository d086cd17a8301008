//! Minimal connection pool for one store file.
//!
//! # Responsibility
//! - Hand each concurrent worker its own SQLite connection.
//! - Reuse idle connections instead of reopening the file per insert.
//!
//! # Invariants
//! - A connection is used by at most one worker at a time.
//! - The pool never holds more than `max_idle` idle connections.
//! - Locking and contention are left to SQLite; the pool only guards its idle list.

use super::open::{open_connection, ConnectionOptions};
use super::DbResult;
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// Pool of connections to a single, already-migrated store file.
#[derive(Debug)]
pub struct ConnectionPool {
    path: PathBuf,
    options: ConnectionOptions,
    max_idle: usize,
    idle: Mutex<Vec<Connection>>,
}

impl ConnectionPool {
    /// Creates an empty pool; connections are opened lazily on checkout.
    pub fn new(path: impl AsRef<Path>, options: ConnectionOptions, max_idle: usize) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            options,
            max_idle: max_idle.max(1),
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Seeds the pool with an existing connection (e.g. the bootstrap one).
    pub fn with_connection(self, conn: Connection) -> Self {
        self.lock_idle().push(conn);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Takes an idle connection or opens a new one.
    pub fn checkout(&self) -> DbResult<PooledConnection<'_>> {
        let reused = self.lock_idle().pop();
        let conn = match reused {
            Some(conn) => conn,
            None => open_connection(&self.path, &self.options)?,
        };

        Ok(PooledConnection {
            pool: self,
            conn: Some(conn),
        })
    }

    /// Number of connections currently waiting for reuse.
    pub fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }

    fn give_back(&self, conn: Connection) {
        let mut idle = self.lock_idle();
        if idle.len() < self.max_idle {
            idle.push(conn);
        }
    }

    fn lock_idle(&self) -> MutexGuard<'_, Vec<Connection>> {
        // A panic while holding the guard cannot leave the Vec half-updated.
        self.idle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Connection checked out of a `ConnectionPool`; returned on drop.
pub struct PooledConnection<'pool> {
    pool: &'pool ConnectionPool,
    conn: Option<Connection>,
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
            .as_ref()
            .unwrap_or_else(|| unreachable!("connection taken before drop"))
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn
            .as_mut()
            .unwrap_or_else(|| unreachable!("connection taken before drop"))
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.give_back(conn);
        }
    }
}
