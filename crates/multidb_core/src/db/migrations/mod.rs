//! Per-store SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register each entity store's schema migrations in increasing order.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic within one store.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - A store only ever receives its own entity's migrations.

use crate::db::{DbError, DbResult};
use crate::model::record::EntityKind;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const USERS_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("users_0001_init.sql"),
}];

const PRODUCTS_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("products_0001_init.sql"),
}];

const ORDERS_MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("orders_0001_init.sql"),
}];

fn migrations_for(kind: EntityKind) -> &'static [Migration] {
    match kind {
        EntityKind::Users => USERS_MIGRATIONS,
        EntityKind::Products => PRODUCTS_MIGRATIONS,
        EntityKind::Orders => ORDERS_MIGRATIONS,
    }
}

/// Returns the latest migration version known for `kind`'s store.
pub fn latest_version(kind: EntityKind) -> u32 {
    migrations_for(kind)
        .last()
        .map_or(0, |migration| migration.version)
}

/// Applies all pending migrations of `kind` on the provided connection.
pub fn apply_migrations(conn: &mut Connection, kind: EntityKind) -> DbResult<()> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version(kind);

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            kind,
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in migrations_for(kind) {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}

fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::latest_version;
    use crate::model::record::EntityKind;

    #[test]
    fn every_store_has_at_least_one_migration() {
        for kind in EntityKind::ALL {
            assert!(latest_version(kind) >= 1, "{kind} has no migrations");
        }
    }
}
