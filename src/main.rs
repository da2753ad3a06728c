//! relay-gateway server entry point.
//!
//! Starts the Axum HTTP server with the WebSocket relay endpoint, the
//! REST introspection endpoints, and the two liveness sweep tasks.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use relay_gateway::api;
use relay_gateway::app_state::AppState;
use relay_gateway::config::RelayConfig;
use relay_gateway::domain::{ConnectionRegistry, ConnectionRole, EventBus, RequestTable};
use relay_gateway::service::Dispatcher;
use relay_gateway::service::sweeper::run_sweeper;
use relay_gateway::ws::handler::ws_handler;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = RelayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting relay-gateway");

    // Build domain layer
    let requesters = Arc::new(ConnectionRegistry::new(ConnectionRole::Requester));
    let workers = Arc::new(ConnectionRegistry::new(ConnectionRole::Worker));
    let requests = Arc::new(RequestTable::new());
    let event_bus = EventBus::new(config.event_bus_capacity);

    // Build service layer
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&requesters),
        Arc::clone(&workers),
        requests,
        event_bus,
        &config,
    ));

    // Start the per-registry liveness sweeps
    let cancel = CancellationToken::new();
    let requester_sweeper = tokio::spawn(run_sweeper(
        requesters,
        config.sweep_interval,
        config.liveness_timeout,
        cancel.clone(),
    ));
    let worker_sweeper = tokio::spawn(run_sweeper(
        workers,
        config.sweep_interval,
        config.liveness_timeout,
        cancel.clone(),
    ));

    // Build application state
    let app_state = AppState { dispatcher };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await?;

    // Stop the sweepers before exiting
    cancel.cancel();
    let _ = requester_sweeper.await;
    let _ = worker_sweeper.await;

    Ok(())
}

/// Resolves on ctrl-c and cancels the background tasks.
async fn shutdown_signal(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
    cancel.cancel();
}
