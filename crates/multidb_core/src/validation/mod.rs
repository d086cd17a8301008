//! Batch validation and cross-referencing.
//!
//! # Responsibility
//! - Classify every raw record as valid or rejected with reasons.
//! - Resolve order references against the *valid* user/product sets.
//!
//! # Invariants
//! - Validation is pure: no I/O, no shared state across calls.
//! - Output preserves input order; `valid.len() + rejected.len() == input.len()`.
//! - Every applicable rule is reported; rules never short-circuit.

pub mod reason;
mod validators;

pub use reason::{Rejection, RejectionReason, Validated};
pub use validators::{is_valid_email, validate_orders, validate_products, validate_users};
