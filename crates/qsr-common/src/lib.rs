//! QSR Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared foundation for the QSR workspace: error handling, logging
//! initialization, runtime configuration, and the bounded worker pool used
//! by both the reload phase and the log-ingestion phase.
//!
//! # Example
//!
//! ```no_run
//! use qsr_common::config::Config;
//! use qsr_common::pool::WorkerPool;
//!
//! fn setup() -> qsr_common::Result<WorkerPool> {
//!     let config = Config::load(None)?;
//!     Ok(WorkerPool::new(config.concurrency))
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod pool;

// Re-export commonly used types
pub use error::{QsrError, Result};
