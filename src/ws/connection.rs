//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming peer events and forwarding addressed relay
//! events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::delivery::DeliveryFilter;
use super::messages::{ClientMessage, ServerMessage};
use crate::domain::{ConnectionId, ConnectionRole, OutboundEvent};
use crate::error::RelayError;
use crate::service::Dispatcher;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads peer events from the socket and hands them to the dispatcher.
/// - Forwards events from the [`broadcast::Receiver`] that the
///   [`DeliveryFilter`] addresses to this connection.
/// - Deregisters the connection when the socket closes.
pub async fn run_connection(
    socket: WebSocket,
    connection_id: ConnectionId,
    mut event_rx: broadcast::Receiver<OutboundEvent>,
    dispatcher: Arc<Dispatcher>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut filter = DeliveryFilter::new(connection_id);

    loop {
        tokio::select! {
            // Incoming message from the peer
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response =
                            handle_client_message(&text, connection_id, &mut filter, &dispatcher)
                                .await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Outbound event from the dispatcher
            event = event_rx.recv() => {
                match event {
                    Ok(outbound) => {
                        if filter.matches(outbound.delivery) {
                            let json =
                                serde_json::to_string(&outbound.event).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(%connection_id, lagged = n, "ws peer lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    if let Some(role) = filter.role() {
        dispatcher.disconnect(role, connection_id).await;
    }
    tracing::debug!(%connection_id, "ws connection closed");
}

/// Handles a text message from the peer, returning an optional JSON error
/// envelope. Relay replies (`work-item`, `work-result`) travel through the
/// event bus, never as direct responses.
async fn handle_client_message(
    text: &str,
    connection_id: ConnectionId,
    filter: &mut DeliveryFilter,
    dispatcher: &Dispatcher,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<ClientMessage>(text) else {
        return error_envelope(&RelayError::InvalidMessage("malformed JSON".to_string()));
    };

    match msg {
        ClientMessage::WorkerConnect => {
            filter.declare(ConnectionRole::Worker);
            dispatcher.connect(ConnectionRole::Worker, connection_id).await;
            None
        }
        ClientMessage::RequesterConnect => {
            filter.declare(ConnectionRole::Requester);
            dispatcher.connect(ConnectionRole::Requester, connection_id).await;
            None
        }
        ClientMessage::WorkerHeartbeat => {
            dispatcher.heartbeat(ConnectionRole::Worker, connection_id).await;
            None
        }
        ClientMessage::RequesterHeartbeat => {
            dispatcher.heartbeat(ConnectionRole::Requester, connection_id).await;
            None
        }
        ClientMessage::SubmitWork {
            request_id,
            request_target,
        } => match dispatcher
            .submit_work(connection_id, request_id, request_target)
            .await
        {
            Ok(()) => None,
            Err(err) => error_envelope(&err),
        },
        ClientMessage::SubmitResult {
            request_id,
            request_target,
            content,
        } => {
            // Unknown or stale IDs are dropped without a signal to anyone.
            let _ = dispatcher
                .submit_result(request_id, request_target, content)
                .await;
            None
        }
    }
}

/// Serializes a [`RelayError`] into the WS error envelope.
fn error_envelope(err: &RelayError) -> Option<String> {
    let msg = ServerMessage::Error {
        code: err.error_code(),
        message: err.to_string(),
    };
    serde_json::to_string(&msg).ok()
}
