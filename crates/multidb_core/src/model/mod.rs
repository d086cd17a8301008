//! Batch domain model for users, products and orders.
//!
//! # Responsibility
//! - Define the typed record shapes shared by validation, insertion and reporting.
//! - Name each entity kind and the store it is bound to.
//!
//! # Invariants
//! - Every record is identified by an externally supplied integer `id`.
//! - Records are read-only after construction; no stage mutates them.

pub mod batch;
pub mod record;
