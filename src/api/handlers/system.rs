//! System endpoints: health check and relay statistics.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Live relay statistics.
#[derive(Debug, Serialize, ToSchema)]
struct StatsResponse {
    /// Currently tracked requester connections.
    requesters: usize,
    /// Currently tracked worker connections.
    workers: usize,
    /// Work requests awaiting a result.
    pending_requests: usize,
    timestamp: String,
}

/// `GET /stats` — Current relay state.
#[utoipa::path(
    get,
    path = "/stats",
    tag = "System",
    summary = "Relay statistics",
    description = "Returns live connection counts per role and the number of outstanding work requests.",
    responses(
        (status = 200, description = "Current relay statistics", body = StatsResponse),
    )
)]
pub async fn stats_handler(State(state): State<AppState>) -> impl IntoResponse {
    let requesters = state.dispatcher.requester_count().await;
    let workers = state.dispatcher.worker_count().await;
    let pending_requests = state.dispatcher.pending_count().await;

    (
        StatusCode::OK,
        Json(StatsResponse {
            requesters,
            workers,
            pending_requests,
            timestamp: Utc::now().to_rfc3339(),
        }),
    )
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
}
