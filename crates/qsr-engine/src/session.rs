//! Protocol session
//!
//! One [`EngineSession`] drives one document through the engine's reload
//! sequence over its own websocket connection: connect, `OpenDoc`,
//! `GetActiveDoc`, `DoReloadEx`, `DoSave`. The steps are strictly ordered
//! with a single request in flight; the first failure aborts the session and
//! the connection is closed before the error is returned. Sessions are never
//! shared across documents or tasks.

use std::path::Path;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace};

use crate::error::EngineError;
use crate::protocol::{
    methods, EngineRequest, EngineResponse, ACTIVE_DOCUMENT_HANDLE, NO_DOCUMENT_HANDLE,
};

/// One reload exchange over one engine connection
pub struct EngineSession {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    next_id: u64,
    handle: i64,
    request_timeout: Duration,
}

impl EngineSession {
    /// Open a connection to the engine endpoint.
    ///
    /// A failure here means the engine host is unreachable for every
    /// document; callers treat it as fatal to the run.
    pub async fn connect(endpoint: &str, request_timeout: Duration) -> Result<Self, EngineError> {
        debug!("Connecting to engine at {}", endpoint);

        let connect = tokio::time::timeout(request_timeout, connect_async(endpoint))
            .await
            .map_err(|_| EngineError::Connect {
                url: endpoint.to_string(),
                message: format!("no answer within {:?}", request_timeout),
            })?;

        let (ws, _response) = connect.map_err(|e| EngineError::Connect {
            url: endpoint.to_string(),
            message: e.to_string(),
        })?;

        debug!("Engine connection established");

        Ok(Self {
            ws,
            next_id: 0,
            handle: NO_DOCUMENT_HANDLE,
            request_timeout,
        })
    }

    /// Run the full reload sequence for one document.
    ///
    /// Whatever the outcome, the connection is closed before this returns.
    pub async fn run(
        endpoint: &str,
        document: &Path,
        request_timeout: Duration,
    ) -> Result<(), EngineError> {
        let mut session = Self::connect(endpoint, request_timeout).await?;
        let result = session.drive(document).await;
        session.close().await;
        result
    }

    /// Steps 2-5 of the sequence, against an established connection
    async fn drive(&mut self, document: &Path) -> Result<(), EngineError> {
        let name = document_name(document);

        info!("Opening document {}...", name);
        self.call(
            methods::OPEN_DOC,
            self.handle,
            json!([document.to_string_lossy(), ""]),
        )
        .await?;
        // The engine assigns the opened document handle 1.
        self.handle = ACTIVE_DOCUMENT_HANDLE;
        info!("Document {} opened", name);

        info!("Verifying active document...");
        self.call(methods::GET_ACTIVE_DOC, NO_DOCUMENT_HANDLE, json!([]))
            .await?;

        info!("Reloading {}...", name);
        let reload = self
            .call(methods::DO_RELOAD_EX, self.handle, json!({}))
            .await?;
        check_reload_result(&reload)?;
        info!("Reload of {} completed", name);

        info!("Saving {}...", name);
        self.call(methods::DO_SAVE, self.handle, json!([])).await?;
        info!("Document {} saved", name);

        Ok(())
    }

    /// Send one request and wait for its matching response.
    ///
    /// Frames whose id does not match (engine-pushed notifications) are
    /// skipped. Each round-trip is bounded by the per-request timeout.
    async fn call(
        &mut self,
        method: &str,
        handle: i64,
        params: Value,
    ) -> Result<Value, EngineError> {
        let id = self.next_id;
        self.next_id += 1;

        let request = EngineRequest::new(id, method, handle, params);
        let payload = serde_json::to_string(&request)?;
        trace!(method, id, handle, "sending engine request");
        self.ws.send(Message::Text(payload.into())).await?;

        loop {
            let frame = tokio::time::timeout(self.request_timeout, self.ws.next())
                .await
                .map_err(|_| EngineError::Timeout(self.request_timeout))?;

            let message = match frame {
                Some(message) => message?,
                None => return Err(EngineError::Transport(tungstenite::Error::ConnectionClosed)),
            };

            match message {
                Message::Text(raw) => {
                    let response: EngineResponse = serde_json::from_str(&raw)?;
                    if response.answers(id) {
                        return response.into_result();
                    }
                    debug!(frame_id = ?response.id, "skipping unrelated engine frame");
                },
                Message::Close(_) => {
                    return Err(EngineError::Transport(tungstenite::Error::ConnectionClosed));
                },
                // Ping/pong and binary frames are not part of the session protocol
                _ => {},
            }
        }
    }

    /// Close the underlying connection, swallowing close-time errors
    async fn close(&mut self) {
        if let Err(e) = self.ws.close(None).await {
            debug!("Error while closing engine connection: {}", e);
        }
    }
}

/// Inspect a `DoReloadEx` result payload.
///
/// `qResult.qSuccess` missing counts as a failed reload; a missing
/// `qResult.qScriptLogFile` just means no log was produced.
fn check_reload_result(result: &Value) -> Result<(), EngineError> {
    let succeeded = result
        .pointer("/qResult/qSuccess")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    if succeeded {
        return Ok(());
    }

    let script_log = result
        .pointer("/qResult/qScriptLogFile")
        .and_then(Value::as_str)
        .map(str::to_owned);

    Err(EngineError::ReloadFailed { script_log })
}

fn document_name(document: &Path) -> String {
    document
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| document.display().to_string())
}
