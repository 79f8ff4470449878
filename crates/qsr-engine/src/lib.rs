//! QSR Engine Client
//!
//! Client for the analytics engine's JSON-RPC-over-websocket protocol and
//! the concurrent reload orchestrator built on top of it.
//!
//! # Overview
//!
//! - **Protocol**: typed request/response envelopes for the engine's wire
//!   format
//! - **Session**: one document's open / verify / reload / save exchange over
//!   its own connection
//! - **Orchestrator**: drives one session per document through the shared
//!   worker pool and aggregates the outcome
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use std::time::Duration;
//! use qsr_common::pool::WorkerPool;
//! use qsr_engine::{EngineError, ReloadOrchestrator};
//!
//! async fn reload_everything() -> Result<(), EngineError> {
//!     let pool = WorkerPool::new(4);
//!     let orchestrator =
//!         ReloadOrchestrator::new("ws://localhost:4848/app", Duration::from_secs(600));
//!     let documents = vec![PathBuf::from("/srv/qlik/apps/Sales.qvf")];
//!     let summary = orchestrator.run_all(documents, &pool).await?;
//!     tracing::info!("{} succeeded, {} failed", summary.succeeded, summary.failed);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod orchestrator;
pub mod protocol;
pub mod session;

// Re-export commonly used types
pub use error::EngineError;
pub use orchestrator::{ReloadOrchestrator, ReloadOutcome, RunSummary};
pub use session::EngineSession;
