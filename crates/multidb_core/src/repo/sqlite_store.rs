//! SQLite-backed record stores, one database file per entity kind.
//!
//! # Responsibility
//! - Bind a store to its own file and bootstrap that file's schema once.
//! - Insert single records inside their own transaction.
//!
//! # Invariants
//! - `SqliteRecordStore<R>` only ever writes `R::KIND`'s table.
//! - No uniqueness or cross-store reference is re-checked here; the table's
//!   primary key is the only constraint.

use crate::db::{open_store_db, ConnectionOptions, ConnectionPool, DbResult};
use crate::model::record::{OrderRecord, ProductRecord, Record, UserRecord};
use crate::repo::record_store::{RecordStore, StoreResult};
use log::trace;
use rusqlite::{params, Connection, TransactionBehavior};
use std::marker::PhantomData;
use std::path::Path;

/// Row mapping between a record type and its store table.
pub trait SqliteRow: Record {
    /// Writes this record as one row. Runs inside a transaction.
    fn insert_row(&self, conn: &Connection) -> rusqlite::Result<()>;
}

impl SqliteRow for UserRecord {
    fn insert_row(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO users (id, name, email) VALUES (?1, ?2, ?3);",
            params![self.id, self.name.as_str(), self.email.as_str()],
        )?;
        Ok(())
    }
}

impl SqliteRow for ProductRecord {
    fn insert_row(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO products (id, name, price) VALUES (?1, ?2, ?3);",
            params![self.id, self.name.as_str(), self.price.to_string()],
        )?;
        Ok(())
    }
}

impl SqliteRow for OrderRecord {
    fn insert_row(&self, conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "INSERT INTO orders (id, user_id, product_id, quantity) VALUES (?1, ?2, ?3, ?4);",
            params![self.id, self.user_id, self.product_id, self.quantity],
        )?;
        Ok(())
    }
}

/// Record store writing one entity kind into its own SQLite file.
pub struct SqliteRecordStore<R> {
    pool: ConnectionPool,
    _record: PhantomData<fn(&R)>,
}

impl<R: SqliteRow> SqliteRecordStore<R> {
    /// Opens (and migrates) the store file at `path`.
    ///
    /// `max_connections` caps idle pooled connections; use the worker count.
    pub fn open(
        path: impl AsRef<Path>,
        options: ConnectionOptions,
        max_connections: usize,
    ) -> DbResult<Self> {
        let path = path.as_ref();
        let conn = open_store_db(path, R::KIND, &options)?;
        let pool = ConnectionPool::new(path, options, max_connections).with_connection(conn);
        Ok(Self {
            pool,
            _record: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        self.pool.path()
    }

    /// Counts rows currently stored. Used for post-run checks.
    pub fn count(&self) -> DbResult<i64> {
        let conn = self.pool.checkout()?;
        let sql = format!("SELECT COUNT(*) FROM {};", R::KIND.as_str());
        let count = conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count)
    }
}

impl<R: SqliteRow> RecordStore<R> for SqliteRecordStore<R> {
    fn insert(&self, record: &R) -> StoreResult<()> {
        let mut conn = self.pool.checkout()?;
        // IMMEDIATE takes the write lock up front so contention surfaces as
        // SQLITE_BUSY at BEGIN instead of mid-statement.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        record.insert_row(&tx)?;
        tx.commit()?;

        trace!(
            "event=store_insert module=repo status=ok store={} id={}",
            R::KIND,
            record.id()
        );
        Ok(())
    }
}
