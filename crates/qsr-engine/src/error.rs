//! Error types for the engine client

use std::time::Duration;
use thiserror::Error;

/// Errors raised while driving a reload session
///
/// Only [`EngineError::Connect`] is systemic: the engine host is assumed
/// unreachable for every document and the run halts. Everything else aborts
/// a single document's session and leaves the rest of the run untouched.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The websocket connection could not be established
    #[error("Failed to connect to engine at {url}: {message}. Make sure the engine desktop is open and logged in.")]
    Connect { url: String, message: String },

    /// The engine answered a request with an error payload
    #[error("Engine error: {0}")]
    Protocol(String),

    /// The reload ran but the engine reported it unsuccessful
    #[error("Reload failed{}", fmt_script_log(.script_log))]
    ReloadFailed {
        /// Engine-provided script log path, when one was produced
        script_log: Option<String>,
    },

    /// No response arrived within the per-request timeout
    #[error("Timed out after {0:?} waiting for an engine response")]
    Timeout(Duration),

    /// The connection failed mid-session
    #[error("Engine connection error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// A frame could not be encoded or decoded
    #[error("Failed to decode engine frame: {0}")]
    Serialization(#[from] serde_json::Error),
}

fn fmt_script_log(script_log: &Option<String>) -> String {
    match script_log {
        Some(path) => format!(" (script log: {})", path),
        None => String::from(" (no script log was produced)"),
    }
}

impl EngineError {
    /// Whether this error halts the whole run rather than one session
    pub fn is_systemic(&self) -> bool {
        matches!(self, EngineError::Connect { .. })
    }
}
