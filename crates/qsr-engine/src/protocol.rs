//! Engine wire protocol
//!
//! JSON-RPC 2.0 envelopes as the engine speaks them: every request carries a
//! document `handle` next to the standard fields, and responses carry either
//! a `result` object or an `error` with a message. A response is matched to
//! its request by `id`; frames with any other id (the engine pushes change
//! notifications on the same connection) are not responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;

/// JSON-RPC version tag sent on every request
pub const JSONRPC_VERSION: &str = "2.0";

/// Handle used before any document is opened
pub const NO_DOCUMENT_HANDLE: i64 = -1;

/// Handle of the active document once opened (engine convention: always 1,
/// one active document per session)
pub const ACTIVE_DOCUMENT_HANDLE: i64 = 1;

/// Engine method names, in the order a session invokes them
pub mod methods {
    pub const OPEN_DOC: &str = "OpenDoc";
    pub const GET_ACTIVE_DOC: &str = "GetActiveDoc";
    pub const DO_RELOAD_EX: &str = "DoReloadEx";
    pub const DO_SAVE: &str = "DoSave";
}

/// Request envelope
#[derive(Debug, Clone, Serialize)]
pub struct EngineRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: &'static str,

    /// Session-scoped request id, monotonically increasing
    pub id: u64,

    /// Method name
    pub method: String,

    /// Document handle the method targets
    pub handle: i64,

    /// Method parameters (array or object, per method)
    pub params: Value,
}

impl EngineRequest {
    pub fn new(id: u64, method: impl Into<String>, handle: i64, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            method: method.into(),
            handle,
            params,
        }
    }
}

/// Response envelope
///
/// Deserialized into an explicit `result`/`error` pair so callers branch on
/// a tagged value rather than probing for fields.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineResponse {
    /// Id of the request this frame answers; notifications carry none
    #[serde(default)]
    pub id: Option<u64>,

    /// Result payload (present on success)
    #[serde(default)]
    pub result: Option<Value>,

    /// Error payload (present on failure)
    #[serde(default)]
    pub error: Option<EngineErrorFrame>,
}

/// Error payload of a response
#[derive(Debug, Clone, Deserialize)]
pub struct EngineErrorFrame {
    #[serde(default)]
    pub code: Option<i64>,

    pub message: String,
}

impl EngineResponse {
    /// Whether this frame answers the request with the given id
    pub fn answers(&self, id: u64) -> bool {
        self.id == Some(id)
    }

    /// Convert into the result payload, or the engine's error message
    pub fn into_result(self) -> Result<Value, EngineError> {
        if let Some(error) = self.error {
            return Err(EngineError::Protocol(error.message));
        }
        Ok(self.result.unwrap_or(Value::Null))
    }
}
