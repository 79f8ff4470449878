//! Error types shared across the QSR workspace

use thiserror::Error;

/// Result type alias for QSR operations
pub type Result<T> = std::result::Result<T, QsrError>;

/// Error type for the shared foundation crate
#[derive(Error, Debug)]
pub enum QsrError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse configuration file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl QsrError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
