//! Concurrent insertion engine.
//!
//! # Responsibility
//! - Insert every record of one entity kind through a bounded worker pool.
//! - Wrap each single-record insert in the retry policy.
//! - Return one outcome per input record, in input order.
//!
//! # Invariants
//! - `insert_all` returns only after every submitted insert has finished.
//! - At most `worker_count` inserts are in flight at once.
//! - A failed record never cancels or blocks its siblings.
//! - The engine holds no locks; contention is the store's concern.

use crate::model::record::{Record, RecordId};
use crate::repo::record_store::{RecordStore, StoreError};
use crate::service::retry::RetryPolicy;
use log::{error, info};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::time::Instant;

/// Default ceiling on concurrent in-flight inserts per phase.
pub const DEFAULT_WORKER_COUNT: usize = 10;

/// Final result of inserting one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionOutcome<R> {
    pub record: R,
    /// Store calls made, including retries.
    pub attempts: u32,
    /// Terminal error; `None` means the record was stored.
    pub error: Option<StoreError>,
}

impl<R: Record> InsertionOutcome<R> {
    pub fn id(&self) -> RecordId {
        self.record.id()
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Bounded worker pool that runs one insertion phase at a time.
pub struct InsertionEngine {
    pool: ThreadPool,
    worker_count: usize,
    retry: RetryPolicy,
}

impl InsertionEngine {
    /// Builds an engine with `worker_count` dedicated worker threads.
    pub fn new(worker_count: usize, retry: RetryPolicy) -> Result<Self, ThreadPoolBuildError> {
        let worker_count = worker_count.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count)
            .thread_name(|index| format!("multidb-insert-{index}"))
            .build()?;

        Ok(Self {
            pool,
            worker_count,
            retry,
        })
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Inserts all `records` concurrently and waits for every one of them.
    ///
    /// Outcomes are positionally aligned with `records` regardless of the
    /// order in which workers finish.
    pub fn insert_all<R, S>(&self, records: &[R], store: &S) -> Vec<InsertionOutcome<R>>
    where
        R: Record + Clone + Send + Sync,
        S: RecordStore<R> + ?Sized,
    {
        let started_at = Instant::now();
        info!(
            "event=insert_phase module=insertion status=start entity={} records={} workers={}",
            R::KIND,
            records.len(),
            self.worker_count
        );

        let outcomes: Vec<InsertionOutcome<R>> = self.pool.install(|| {
            records
                .par_iter()
                // One task per record so a slow retry never holds up a chunk.
                .with_max_len(1)
                .map(|record| self.insert_one(record, store))
                .collect()
        });

        let failed = outcomes.iter().filter(|outcome| !outcome.succeeded()).count();
        info!(
            "event=insert_phase module=insertion status=ok entity={} inserted={} failed={} duration_ms={}",
            R::KIND,
            outcomes.len() - failed,
            failed,
            started_at.elapsed().as_millis()
        );

        outcomes
    }

    fn insert_one<R, S>(&self, record: &R, store: &S) -> InsertionOutcome<R>
    where
        R: Record + Clone,
        S: RecordStore<R> + ?Sized,
    {
        let retried = self.retry.execute(|| store.insert(record));
        if let Err(err) = &retried.result {
            error!(
                "event=insert module=insertion status=error entity={} id={} attempts={} error={}",
                R::KIND,
                record.id(),
                retried.attempts,
                err
            );
        }

        InsertionOutcome {
            record: record.clone(),
            attempts: retried.attempts,
            error: retried.result.err(),
        }
    }
}
