//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::Dispatcher;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Dispatcher for all relay logic; also exposes the event bus.
    pub dispatcher: Arc<Dispatcher>,
}
