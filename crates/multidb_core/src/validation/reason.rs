//! Rejection reasons and validation result containers.

use crate::model::record::{Record, RecordId};
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// One reason a record failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum RejectionReason {
    MissingName,
    InvalidEmail,
    DuplicateEmail,
    NonPositivePrice,
    NonPositiveQuantity,
    UnknownUser { user_id: RecordId },
    UnknownProduct { product_id: RecordId },
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => f.write_str("missing name"),
            Self::InvalidEmail => f.write_str("invalid email"),
            Self::DuplicateEmail => f.write_str("duplicate email"),
            Self::NonPositivePrice => f.write_str("price must be > 0"),
            Self::NonPositiveQuantity => f.write_str("quantity must be > 0"),
            Self::UnknownUser { user_id } => write!(f, "user_id {user_id} not found"),
            Self::UnknownProduct { product_id } => write!(f, "product_id {product_id} not found"),
        }
    }
}

/// A rejected record with its distinct reasons in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection<R> {
    pub record: R,
    reasons: Vec<RejectionReason>,
}

impl<R: Record> Rejection<R> {
    /// Builds a rejection, dropping repeated reasons while keeping first-seen order.
    ///
    /// Returns `None` when `reasons` is empty, i.e. the record is valid.
    pub fn from_reasons(record: R, reasons: Vec<RejectionReason>) -> Option<Self> {
        if reasons.is_empty() {
            return None;
        }

        let mut distinct: Vec<RejectionReason> = Vec::with_capacity(reasons.len());
        for reason in reasons {
            if !distinct.contains(&reason) {
                distinct.push(reason);
            }
        }

        Some(Self {
            record,
            reasons: distinct,
        })
    }

    pub fn id(&self) -> RecordId {
        self.record.id()
    }

    pub fn reasons(&self) -> &[RejectionReason] {
        &self.reasons
    }

    /// Human-readable reasons, e.g. `["missing name", "invalid email"]`.
    pub fn reason_strings(&self) -> Vec<String> {
        self.reasons.iter().map(ToString::to_string).collect()
    }

    pub fn has_reason(&self, reason: &RejectionReason) -> bool {
        self.reasons.contains(reason)
    }
}

/// Result of one validation pass over a single entity collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated<R> {
    pub valid: Vec<R>,
    pub rejected: Vec<Rejection<R>>,
}

impl<R> Validated<R> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            valid: Vec::with_capacity(capacity),
            rejected: Vec::new(),
        }
    }

    /// Number of records classified (valid plus rejected).
    pub fn total(&self) -> usize {
        self.valid.len() + self.rejected.len()
    }
}
