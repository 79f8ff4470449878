//! Error types for the log-harvest pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Errors raised while extracting and persisting reload logs
///
/// `MalformedPath` and `MalformedDate` abort one file's extraction;
/// `Database` aborts one query or one pack's insert. None of them abort
/// sibling units of work.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// The log path is too shallow to recover an archival path from
    #[error("Invalid log path structure: {0}")]
    MalformedPath(PathBuf),

    /// The filename's date token could not be parsed as YYYYMMDD
    #[error("Invalid date token '{token}' in log filename")]
    MalformedDate { token: String },

    /// The log file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A store query or batch insert failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
