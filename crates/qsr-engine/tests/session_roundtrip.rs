//! Session tests against a scripted in-process engine.
//!
//! The fake engine accepts one websocket connection, answers each request
//! with the next scripted reply (patching in the request's id), and records
//! every request it saw plus whether the client closed the connection.

use std::path::Path;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

use qsr_engine::{EngineError, EngineSession};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

struct EngineScript {
    requests: Vec<Value>,
    client_closed: bool,
}

async fn spawn_engine(replies: Vec<Value>) -> (String, JoinHandle<EngineScript>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        let mut script = EngineScript {
            requests: Vec::new(),
            client_closed: false,
        };
        let mut replies = replies.into_iter();

        while let Some(frame) = ws.next().await {
            match frame {
                Ok(Message::Text(raw)) => {
                    let request: Value = serde_json::from_str(&raw).unwrap();
                    let mut reply = replies.next().expect("engine script exhausted");
                    reply["id"] = request["id"].clone();
                    script.requests.push(request);
                    ws.send(Message::Text(reply.to_string().into())).await.unwrap();
                },
                Ok(Message::Close(_)) => {
                    script.client_closed = true;
                    break;
                },
                Ok(_) => {},
                Err(_) => break,
            }
        }

        script
    });

    (url, handle)
}

fn open_doc_reply() -> Value {
    json!({
        "jsonrpc": "2.0",
        "result": {"qReturn": {"qType": "Doc", "qHandle": 1}}
    })
}

#[tokio::test]
async fn successful_session_makes_four_round_trips_and_closes() {
    let replies = vec![
        open_doc_reply(),
        open_doc_reply(),
        json!({"jsonrpc": "2.0", "result": {"qResult": {"qSuccess": true}}}),
        json!({"jsonrpc": "2.0", "result": {}}),
    ];
    let (url, engine) = spawn_engine(replies).await;

    let result = EngineSession::run(&url, Path::new("/apps/Sales.qvf"), REQUEST_TIMEOUT).await;
    assert!(result.is_ok(), "unexpected failure: {:?}", result);

    let script = engine.await.unwrap();
    assert!(script.client_closed, "session left the connection open");

    let methods: Vec<&str> = script
        .requests
        .iter()
        .map(|r| r["method"].as_str().unwrap())
        .collect();
    assert_eq!(methods, ["OpenDoc", "GetActiveDoc", "DoReloadEx", "DoSave"]);

    // Pre-open calls target handle -1, post-open calls the active document.
    assert_eq!(script.requests[0]["handle"], json!(-1));
    assert_eq!(script.requests[1]["handle"], json!(-1));
    assert_eq!(script.requests[2]["handle"], json!(1));
    assert_eq!(script.requests[3]["handle"], json!(1));

    // Request ids are session-scoped and monotonically increasing.
    let ids: Vec<u64> = script
        .requests
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, [0, 1, 2, 3]);

    assert_eq!(script.requests[0]["params"], json!(["/apps/Sales.qvf", ""]));
}

#[tokio::test]
async fn open_error_aborts_after_first_request_and_closes() {
    let replies = vec![json!({
        "jsonrpc": "2.0",
        "error": {"code": 404, "message": "App not found"}
    })];
    let (url, engine) = spawn_engine(replies).await;

    let result = EngineSession::run(&url, Path::new("/apps/Missing.qvf"), REQUEST_TIMEOUT).await;
    match result {
        Err(EngineError::Protocol(message)) => assert_eq!(message, "App not found"),
        other => panic!("expected protocol error, got {:?}", other),
    }

    let script = engine.await.unwrap();
    assert_eq!(script.requests.len(), 1);
    assert!(script.client_closed, "session left the connection open");
}

#[tokio::test]
async fn failed_reload_surfaces_script_log_and_skips_save() {
    let replies = vec![
        open_doc_reply(),
        open_doc_reply(),
        json!({
            "jsonrpc": "2.0",
            "result": {"qResult": {"qSuccess": false, "qScriptLogFile": "/logs/Sales.log"}}
        }),
    ];
    let (url, engine) = spawn_engine(replies).await;

    let result = EngineSession::run(&url, Path::new("/apps/Sales.qvf"), REQUEST_TIMEOUT).await;
    match result {
        Err(EngineError::ReloadFailed { script_log }) => {
            assert_eq!(script_log.as_deref(), Some("/logs/Sales.log"));
        },
        other => panic!("expected reload failure, got {:?}", other),
    }

    let script = engine.await.unwrap();
    assert_eq!(script.requests.len(), 3, "DoSave must not run after a failed reload");
    assert!(script.client_closed, "session left the connection open");
}

#[tokio::test]
async fn failed_reload_without_log_reports_none() {
    let replies = vec![
        open_doc_reply(),
        open_doc_reply(),
        json!({"jsonrpc": "2.0", "result": {"qResult": {"qSuccess": false}}}),
    ];
    let (url, engine) = spawn_engine(replies).await;

    let result = EngineSession::run(&url, Path::new("/apps/Sales.qvf"), REQUEST_TIMEOUT).await;
    match result {
        Err(EngineError::ReloadFailed { script_log }) => assert!(script_log.is_none()),
        other => panic!("expected reload failure, got {:?}", other),
    }

    engine.await.unwrap();
}

#[tokio::test]
async fn notification_frames_are_skipped() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());

    // Engine that pushes a notification before answering the first request,
    // then fails the open so the session stops after one round-trip.
    let engine = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();

        let frame = ws.next().await.unwrap().unwrap();
        let request: Value = serde_json::from_str(frame.to_text().unwrap()).unwrap();

        let notification = json!({"jsonrpc": "2.0", "method": "OnConnected", "params": {}});
        ws.send(Message::Text(notification.to_string().into()))
            .await
            .unwrap();

        let reply = json!({
            "jsonrpc": "2.0",
            "id": request["id"],
            "error": {"message": "App not found"}
        });
        ws.send(Message::Text(reply.to_string().into())).await.unwrap();

        // Drain until the client closes.
        while let Some(Ok(frame)) = ws.next().await {
            if matches!(frame, Message::Close(_)) {
                break;
            }
        }
    });

    let result = EngineSession::run(&url, Path::new("/apps/Sales.qvf"), REQUEST_TIMEOUT).await;
    match result {
        Err(EngineError::Protocol(message)) => assert_eq!(message, "App not found"),
        other => panic!("expected protocol error, got {:?}", other),
    }

    engine.await.unwrap();
}

#[tokio::test]
async fn unreachable_engine_is_a_connect_error() {
    // Nothing listens on this port; the connection is refused.
    let result = EngineSession::run(
        "ws://127.0.0.1:1",
        Path::new("/apps/Sales.qvf"),
        Duration::from_secs(2),
    )
    .await;

    match result {
        Err(e @ EngineError::Connect { .. }) => assert!(e.is_systemic()),
        other => panic!("expected connect error, got {:?}", other),
    }
}
