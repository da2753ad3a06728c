//! End-to-end relay tests over real WebSocket connections.
//!
//! Spins up the full axum server on an ephemeral port with shortened
//! liveness timeouts and drives it with `tokio-tungstenite` clients.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;

use relay_gateway::api;
use relay_gateway::app_state::AppState;
use relay_gateway::config::RelayConfig;
use relay_gateway::domain::{ConnectionRegistry, ConnectionRole, EventBus, RequestTable};
use relay_gateway::service::Dispatcher;
use relay_gateway::service::sweeper::run_sweeper;
use relay_gateway::ws::handler::ws_handler;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const LIVENESS_TIMEOUT: Duration = Duration::from_millis(300);
const SWEEP_INTERVAL: Duration = Duration::from_millis(30);
const RECV_TIMEOUT: Duration = Duration::from_secs(2);

struct TestRelay {
    addr: SocketAddr,
    cancel: CancellationToken,
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn spawn_relay() -> TestRelay {
    let Ok(listen_addr) = "127.0.0.1:0".parse() else {
        panic!("valid addr");
    };
    let config = RelayConfig {
        listen_addr,
        liveness_timeout: LIVENESS_TIMEOUT,
        sweep_interval: SWEEP_INTERVAL,
        event_bus_capacity: 1_000,
        broadcast_results: false,
    };

    let requesters = Arc::new(ConnectionRegistry::new(ConnectionRole::Requester));
    let workers = Arc::new(ConnectionRegistry::new(ConnectionRole::Worker));
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&requesters),
        Arc::clone(&workers),
        Arc::new(RequestTable::new()),
        EventBus::new(config.event_bus_capacity),
        &config,
    ));

    let cancel = CancellationToken::new();
    tokio::spawn(run_sweeper(
        requesters,
        config.sweep_interval,
        config.liveness_timeout,
        cancel.clone(),
    ));
    tokio::spawn(run_sweeper(
        workers,
        config.sweep_interval,
        config.liveness_timeout,
        cancel.clone(),
    ));

    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .with_state(AppState { dispatcher });

    let Ok(listener) = tokio::net::TcpListener::bind(config.listen_addr).await else {
        panic!("bind failed");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("no local addr");
    };

    let serve_cancel = cancel.clone();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app)
            .with_graceful_shutdown(async move { serve_cancel.cancelled().await })
            .await;
    });

    TestRelay { addr, cancel }
}

async fn connect(addr: SocketAddr) -> WsClient {
    let result = connect_async(format!("ws://{addr}/ws")).await;
    let Ok((ws, _)) = result else {
        panic!("websocket connect failed");
    };
    ws
}

async fn send_json(ws: &mut WsClient, value: serde_json::Value) {
    let text = value.to_string();
    let sent = ws.send(Message::text(text)).await;
    assert!(sent.is_ok(), "send failed");
}

/// Receives the next text frame as JSON, skipping control frames.
async fn recv_json(ws: &mut WsClient) -> serde_json::Value {
    loop {
        let frame = tokio::time::timeout(RECV_TIMEOUT, ws.next()).await;
        let Ok(Some(Ok(msg))) = frame else {
            panic!("no message within {RECV_TIMEOUT:?}");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str(text.as_str()) else {
                panic!("non-JSON text frame: {text}");
            };
            return value;
        }
    }
}

/// Asserts that no text frame arrives within `window`.
async fn assert_silent(ws: &mut WsClient, window: Duration) {
    let frame = tokio::time::timeout(window, ws.next()).await;
    if let Ok(Some(Ok(Message::Text(text)))) = frame {
        panic!("unexpected message: {text}");
    }
}

async fn fetch_stats(addr: SocketAddr) -> serde_json::Value {
    let resp = reqwest::get(format!("http://{addr}/stats")).await;
    let Ok(resp) = resp else {
        panic!("stats request failed");
    };
    let Ok(body) = resp.json::<serde_json::Value>().await else {
        panic!("stats body not JSON");
    };
    body
}

/// Polls `/stats` until `pred` holds or the deadline expires.
async fn wait_for_stats<F>(addr: SocketAddr, pred: F)
where
    F: Fn(&serde_json::Value) -> bool,
{
    let deadline = tokio::time::Instant::now() + RECV_TIMEOUT;
    loop {
        let stats = fetch_stats(addr).await;
        if pred(&stats) {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("stats condition not reached, last: {stats}");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let relay = spawn_relay().await;
    let resp = reqwest::get(format!("http://{}/health", relay.addr)).await;
    let Ok(resp) = resp else {
        panic!("health request failed");
    };
    assert!(resp.status().is_success());
    let Ok(body) = resp.json::<serde_json::Value>().await else {
        panic!("health body not JSON");
    };
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn submit_without_worker_yields_error_result() {
    let relay = spawn_relay().await;
    let mut requester = connect(relay.addr).await;

    send_json(&mut requester, serde_json::json!({"event": "requester-connect"})).await;
    let request_id = uuid::Uuid::new_v4().to_string();
    send_json(
        &mut requester,
        serde_json::json!({
            "event": "submit-work",
            "request_id": request_id,
            "request_target": "resource://item/1",
        }),
    )
    .await;

    let result = recv_json(&mut requester).await;
    assert_eq!(result["event"], "work-result");
    assert_eq!(result["request_id"], request_id.as_str());
    assert_eq!(result["status"], "Error");
    assert_eq!(result["message"], "No available worker");
    assert!(result["content"].is_null());

    // Exactly one event: nothing else follows.
    assert_silent(&mut requester, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn malformed_message_gets_error_envelope() {
    let relay = spawn_relay().await;
    let mut peer = connect(relay.addr).await;

    let sent = peer.send(Message::text("not json")).await;
    assert!(sent.is_ok());

    let reply = recv_json(&mut peer).await;
    assert_eq!(reply["event"], "error");
    assert_eq!(reply["code"], 1001);
}

#[tokio::test]
async fn unknown_result_is_dropped_silently() {
    let relay = spawn_relay().await;
    let mut worker = connect(relay.addr).await;
    let mut requester = connect(relay.addr).await;

    send_json(&mut worker, serde_json::json!({"event": "worker-connect"})).await;
    send_json(&mut requester, serde_json::json!({"event": "requester-connect"})).await;

    send_json(
        &mut worker,
        serde_json::json!({
            "event": "submit-result",
            "request_id": uuid::Uuid::new_v4().to_string(),
            "request_target": "resource://item/9",
            "content": "stale",
        }),
    )
    .await;

    assert_silent(&mut requester, Duration::from_millis(200)).await;
    assert_silent(&mut worker, Duration::from_millis(50)).await;
}

#[tokio::test]
async fn full_exchange_then_eviction() {
    let relay = spawn_relay().await;

    // Register worker W1, no heartbeat yet.
    let mut worker = connect(relay.addr).await;
    send_json(&mut worker, serde_json::json!({"event": "worker-connect"})).await;

    // Heartbeat at t=0.
    send_json(&mut worker, serde_json::json!({"event": "worker-heartbeat"})).await;
    wait_for_stats(relay.addr, |s| s["workers"] == 1).await;

    // Requester submits R1.
    let mut requester = connect(relay.addr).await;
    send_json(&mut requester, serde_json::json!({"event": "requester-connect"})).await;

    // Refresh the heartbeat so selection sees a fresh worker even on a
    // slow run.
    send_json(&mut worker, serde_json::json!({"event": "worker-heartbeat"})).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let r1 = uuid::Uuid::new_v4().to_string();
    send_json(
        &mut requester,
        serde_json::json!({
            "event": "submit-work",
            "request_id": r1,
            "request_target": "resource://item/1",
        }),
    )
    .await;

    // W1 receives the work item with the submitted correlation data.
    let item = recv_json(&mut worker).await;
    assert_eq!(item["event"], "work-item");
    assert_eq!(item["request_id"], r1.as_str());
    assert_eq!(item["request_target"], "resource://item/1");

    // W1 returns the result; the requester gets Success with the content.
    send_json(
        &mut worker,
        serde_json::json!({
            "event": "submit-result",
            "request_id": r1,
            "request_target": "resource://item/1",
            "content": "ok",
        }),
    )
    .await;
    let result = recv_json(&mut requester).await;
    assert_eq!(result["event"], "work-result");
    assert_eq!(result["request_id"], r1.as_str());
    assert_eq!(result["status"], "Success");
    assert_eq!(result["message"], "Success");
    assert_eq!(result["content"], "ok");

    // The pending entry is gone once resolved.
    wait_for_stats(relay.addr, |s| s["pending_requests"] == 0).await;

    // W1 stops heartbeating; the sweeper evicts it.
    wait_for_stats(relay.addr, |s| s["workers"] == 0).await;

    // R2 now finds no live worker.
    let r2 = uuid::Uuid::new_v4().to_string();
    send_json(
        &mut requester,
        serde_json::json!({
            "event": "submit-work",
            "request_id": r2,
            "request_target": "resource://item/2",
        }),
    )
    .await;
    let result = recv_json(&mut requester).await;
    assert_eq!(result["event"], "work-result");
    assert_eq!(result["request_id"], r2.as_str());
    assert_eq!(result["status"], "Error");
    assert_eq!(result["message"], "No available worker");
}

#[tokio::test]
async fn heartbeats_keep_worker_alive_across_sweeps() {
    let relay = spawn_relay().await;

    let mut worker = connect(relay.addr).await;
    send_json(&mut worker, serde_json::json!({"event": "worker-connect"})).await;

    // Heartbeat faster than the timeout for several sweep cycles.
    for _ in 0..5 {
        send_json(&mut worker, serde_json::json!({"event": "worker-heartbeat"})).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    let stats = fetch_stats(relay.addr).await;
    assert_eq!(stats["workers"], 1);
}

#[tokio::test]
async fn disconnect_deregisters_connection() {
    let relay = spawn_relay().await;

    let worker = {
        let mut worker = connect(relay.addr).await;
        send_json(&mut worker, serde_json::json!({"event": "worker-connect"})).await;
        wait_for_stats(relay.addr, |s| s["workers"] == 1).await;
        worker
    };

    drop(worker);
    wait_for_stats(relay.addr, |s| s["workers"] == 0).await;
}
