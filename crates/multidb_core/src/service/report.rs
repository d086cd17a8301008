//! Per-entity batch reports.
//!
//! # Responsibility
//! - Aggregate insertion outcomes and validation rejections per entity kind.
//!
//! # Invariants
//! - Pure aggregation: no I/O; rendering belongs to the caller's sink.
//! - Detail lists keep original input order.
//! - `inserted_count + failed_count` equals the number of valid records.

use crate::model::record::{EntityKind, Record, RecordId};
use crate::repo::record_store::StoreError;
use crate::service::insertion::InsertionOutcome;
use crate::validation::Rejection;
use serde::Serialize;

/// One record rejected during validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub id: RecordId,
    pub reasons: Vec<String>,
}

impl SkippedRecord {
    /// Reasons joined the way report lines show them: `a, b`.
    pub fn joined_reasons(&self) -> String {
        self.reasons.join(", ")
    }
}

/// One valid record the store refused after retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedRecord {
    pub id: RecordId,
    pub attempts: u32,
    pub error: StoreError,
}

/// Accounting for one entity kind and its store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityReport {
    pub entity: EntityKind,
    pub inserted_count: usize,
    pub skipped_count: usize,
    pub failed_count: usize,
    pub skipped_details: Vec<SkippedRecord>,
    pub failed_details: Vec<FailedRecord>,
}

impl EntityReport {
    /// Store file the inserted rows went to.
    pub fn store_file_name(&self) -> &'static str {
        self.entity.store_file_name()
    }

    /// Ids of skipped records in input order.
    pub fn skipped_ids(&self) -> Vec<RecordId> {
        self.skipped_details.iter().map(|detail| detail.id).collect()
    }
}

/// Reports for all three entity kinds of one batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub users: EntityReport,
    pub products: EntityReport,
    pub orders: EntityReport,
}

impl BatchReport {
    /// Reports in phase order: users, products, orders.
    pub fn entities(&self) -> [&EntityReport; 3] {
        [&self.users, &self.products, &self.orders]
    }

    pub fn total_inserted(&self) -> usize {
        self.entities()
            .iter()
            .map(|report| report.inserted_count)
            .sum()
    }

    pub fn has_failures(&self) -> bool {
        self.entities().iter().any(|report| report.failed_count > 0)
    }
}

/// Builds the report for one entity kind.
pub fn summarize<R: Record>(
    outcomes: &[InsertionOutcome<R>],
    rejected: &[Rejection<R>],
) -> EntityReport {
    let skipped_details: Vec<SkippedRecord> = rejected
        .iter()
        .map(|rejection| SkippedRecord {
            id: rejection.id(),
            reasons: rejection.reason_strings(),
        })
        .collect();

    let failed_details: Vec<FailedRecord> = outcomes
        .iter()
        .filter_map(|outcome| {
            outcome.error.as_ref().map(|error| FailedRecord {
                id: outcome.id(),
                attempts: outcome.attempts,
                error: error.clone(),
            })
        })
        .collect();

    EntityReport {
        entity: R::KIND,
        inserted_count: outcomes.len() - failed_details.len(),
        skipped_count: skipped_details.len(),
        failed_count: failed_details.len(),
        skipped_details,
        failed_details,
    }
}
