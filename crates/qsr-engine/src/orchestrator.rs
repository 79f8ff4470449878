//! Reload orchestrator
//!
//! Drives one [`EngineSession`] per candidate document through the shared
//! worker pool and aggregates per-document outcomes into a [`RunSummary`].
//! Documents are independent units of work: no outcome influences another
//! document's processing, and nothing is retried; operators re-run the
//! whole process to retry failures.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{error, info};

use qsr_common::pool::WorkerPool;

use crate::error::EngineError;
use crate::session::EngineSession;

/// Result of one document's session
#[derive(Debug)]
pub struct ReloadOutcome {
    /// Document file name, for reporting
    pub document: String,

    /// Success, or the error that aborted the session
    pub result: Result<(), EngineError>,
}

impl ReloadOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregated result of a reload phase
#[derive(Debug)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
    pub outcomes: Vec<ReloadOutcome>,
}

/// Runs the reload phase over a set of documents
pub struct ReloadOrchestrator {
    endpoint: String,
    request_timeout: Duration,
}

impl ReloadOrchestrator {
    pub fn new(endpoint: impl Into<String>, request_timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            request_timeout,
        }
    }

    /// Reload every document, one session each, bounded by the pool.
    ///
    /// Returns `Err` only for a systemic connection failure, where the engine
    /// host is assumed unreachable for all documents. Per-document protocol
    /// and reload failures are reported inside the summary.
    pub async fn run_all(
        &self,
        documents: Vec<PathBuf>,
        pool: &WorkerPool,
    ) -> Result<RunSummary, EngineError> {
        let start = Instant::now();

        info!(
            "Reloading {} documents (concurrency={})",
            documents.len(),
            pool.limit()
        );

        let mut outcomes: Vec<ReloadOutcome> = pool
            .run_all(documents, |document| {
                let endpoint = self.endpoint.clone();
                let request_timeout = self.request_timeout;
                async move {
                    let name = document
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| document.display().to_string());

                    let result = EngineSession::run(&endpoint, &document, request_timeout).await;

                    match &result {
                        Ok(()) => info!("Reloaded {}", name),
                        Err(e) => error!("Reload of {} failed: {}", name, e),
                    }

                    ReloadOutcome {
                        document: name,
                        result,
                    }
                }
            })
            .await;

        // A connect failure means the engine was unreachable; surface it as
        // the run's error once every started session has finished.
        if let Some(index) = outcomes
            .iter()
            .position(|o| matches!(o.result, Err(ref e) if e.is_systemic()))
        {
            let outcome = outcomes.swap_remove(index);
            if let Err(e) = outcome.result {
                return Err(e);
            }
        }

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = outcomes.len() - succeeded;
        let elapsed = start.elapsed();

        info!(
            "Reload phase finished: {} succeeded, {} failed in {:.2}s",
            succeeded,
            failed,
            elapsed.as_secs_f64()
        );

        Ok(RunSummary {
            succeeded,
            failed,
            elapsed,
            outcomes,
        })
    }
}
