//! Batch use-case services.
//!
//! # Responsibility
//! - Retry single-record writes on transient store contention.
//! - Fan each entity phase out to a bounded worker pool and join it.
//! - Orchestrate validation, insertion and reporting for a whole batch.
//!
//! # See also
//! - `crate::validation` for the classification rules.

pub mod batch_runner;
pub mod insertion;
pub mod report;
pub mod retry;
