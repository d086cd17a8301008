//! Per-entity record stores.
//!
//! # Responsibility
//! - Define the single-record insert contract every entity store honors.
//! - Classify store failures as transient (busy/locked) or permanent.
//! - Keep SQL details inside the SQLite implementation.
//!
//! # Invariants
//! - One store instance is bound to exactly one entity kind and one database.
//! - Each insert is atomic for that single record; nothing spans records.
//! - Stores are safe to call from many workers at once.

pub mod record_store;
pub mod sqlite_store;
