//! Axum WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::IntoResponse;

use super::connection::run_connection;
use crate::app_state::AppState;
use crate::domain::ConnectionId;

/// `GET /ws` — Upgrade HTTP connection to WebSocket.
///
/// Assigns the transport-level connection identity. The connect itself is
/// informational; nothing is registered until the peer declares a role.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let connection_id = ConnectionId::new();
    tracing::info!(%connection_id, "connection opened");

    let event_rx = state.dispatcher.event_bus().subscribe();
    let dispatcher = Arc::clone(&state.dispatcher);

    ws.on_upgrade(move |socket| run_connection(socket, connection_id, event_rx, dispatcher))
}
