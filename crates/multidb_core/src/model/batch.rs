//! Input batch of users, products and orders.
//!
//! # Responsibility
//! - Deserialize a JSON batch into typed record collections.
//! - Expose the embedded sample batch used by the CLI and tests.
//!
//! # Invariants
//! - Collections keep input order; every later stage reports in this order.

use crate::model::record::{OrderRecord, ProductRecord, UserRecord};
use serde::{Deserialize, Serialize};

const SAMPLE_BATCH_JSON: &str = include_str!("../../fixtures/sample_batch.json");

/// One batch of related records processed by a single run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordBatch {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub orders: Vec<OrderRecord>,
}

impl RecordBatch {
    /// Parses a batch from JSON text.
    ///
    /// # Errors
    /// - Returns an error when the document is not a batch object, when a
    ///   row lacks `id`, or when a numeric/decimal field cannot be parsed.
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Returns the built-in sample batch (10 users, 10 products, 10 orders).
    pub fn sample() -> Self {
        // The fixture is compiled in and covered by tests.
        Self::from_json_str(SAMPLE_BATCH_JSON).unwrap_or_default()
    }

    /// Total number of rows across all entity kinds.
    pub fn len(&self) -> usize {
        self.users.len() + self.products.len() + self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
