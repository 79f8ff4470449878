//! Bounded worker pool
//!
//! One [`WorkerPool`] is constructed per run and shared by the reload phase
//! and the log-ingestion phase; the phases run sequentially, so the limit
//! applies to whichever phase is active. Each unit of work is independent;
//! the pool makes no ordering guarantees across items.

use futures::stream::{self, StreamExt};
use std::future::Future;
use std::num::NonZeroUsize;

/// Fixed-concurrency executor for independent units of work
#[derive(Debug, Clone)]
pub struct WorkerPool {
    limit: usize,
}

impl WorkerPool {
    /// Create a pool with the given concurrency limit (clamped to >= 1)
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    /// Create a pool sized to the available processing units
    pub fn from_available_parallelism() -> Self {
        let limit = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(1);
        Self::new(limit)
    }

    /// The configured concurrency limit
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Run `task` over every item with at most `limit` futures in flight.
    ///
    /// Every item is attempted exactly once. Results are collected in
    /// completion order, which is unspecified.
    pub async fn run_all<I, F, Fut, R>(&self, items: I, task: F) -> Vec<R>
    where
        I: IntoIterator,
        F: Fn(I::Item) -> Fut,
        Fut: Future<Output = R>,
    {
        stream::iter(items)
            .map(task)
            .buffer_unordered(self.limit)
            .collect()
            .await
    }
}
