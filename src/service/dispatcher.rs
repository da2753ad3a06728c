//! Dispatcher: wires inbound events to the registries, selector, and
//! request table, and emits outbound events through the bus.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RelayConfig;
use crate::domain::{
    ConnectionId, ConnectionRegistry, ConnectionRole, Delivery, EventBus, OutboundEvent,
    PendingRequest, RelayEvent, RequestId, RequestTable, ResultStatus,
};
use crate::error::RelayError;
use crate::service::selector;

/// Orchestration layer for all relay operations.
///
/// Owns the two [`ConnectionRegistry`] instances, the [`RequestTable`],
/// and the [`EventBus`]. Every handler follows the pattern: mutate owned
/// state → emit events → log. Handlers suspend only on the internal locks,
/// never on IO, so they are effectively atomic with respect to the state
/// they touch.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    requesters: Arc<ConnectionRegistry>,
    workers: Arc<ConnectionRegistry>,
    requests: Arc<RequestTable>,
    event_bus: EventBus,
    liveness_timeout: Duration,
    broadcast_results: bool,
}

impl Dispatcher {
    /// Creates a new `Dispatcher` over the given components.
    #[must_use]
    pub fn new(
        requesters: Arc<ConnectionRegistry>,
        workers: Arc<ConnectionRegistry>,
        requests: Arc<RequestTable>,
        event_bus: EventBus,
        config: &RelayConfig,
    ) -> Self {
        Self {
            requesters,
            workers,
            requests,
            event_bus,
            liveness_timeout: config.liveness_timeout,
            broadcast_results: config.broadcast_results,
        }
    }

    /// Returns a reference to the inner [`EventBus`].
    #[must_use]
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Returns the registry for the given role.
    #[must_use]
    pub fn registry(&self, role: ConnectionRole) -> &Arc<ConnectionRegistry> {
        match role {
            ConnectionRole::Requester => &self.requesters,
            ConnectionRole::Worker => &self.workers,
        }
    }

    /// Handles a `requester-connect` / `worker-connect` event.
    pub async fn connect(&self, role: ConnectionRole, connection_id: ConnectionId) {
        self.registry(role).register(connection_id).await;
    }

    /// Handles a `requester-heartbeat` / `worker-heartbeat` event.
    ///
    /// A heartbeat for a connection the registry no longer knows (late,
    /// spurious, or post-eviction) is silently ignored.
    pub async fn heartbeat(&self, role: ConnectionRole, connection_id: ConnectionId) {
        self.registry(role).heartbeat(connection_id, Instant::now()).await;
    }

    /// Deregisters a connection whose socket has closed.
    pub async fn disconnect(&self, role: ConnectionRole, connection_id: ConnectionId) {
        self.registry(role).remove(connection_id).await;
    }

    /// Handles a `submit-work` event from a requester.
    ///
    /// Records the pending request, selects a live worker, and forwards
    /// the work item to it. With no live worker the origin receives an
    /// error `work-result` immediately and the entry is dropped — the
    /// request has reached a terminal outcome.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::DuplicateRequestId`] if the ID collides with
    /// a request that is still pending; the caller reports it back to the
    /// submitter and nothing is dispatched.
    pub async fn submit_work(
        &self,
        origin: ConnectionId,
        request_id: RequestId,
        request_target: String,
    ) -> Result<(), RelayError> {
        self.requests
            .insert(PendingRequest::new(request_id, request_target.clone(), origin))
            .await?;

        let now = Instant::now();
        match selector::select_worker(&self.workers, now, self.liveness_timeout).await {
            Some(worker) => {
                self.event_bus.publish(OutboundEvent {
                    delivery: Delivery::Connection(worker),
                    event: RelayEvent::WorkItem {
                        request_id,
                        request_target,
                    },
                });
                tracing::info!(%request_id, %worker, "work item dispatched");
            }
            None => {
                let _ = self.requests.complete(request_id).await;
                self.event_bus.publish(OutboundEvent {
                    delivery: Delivery::Connection(origin),
                    event: RelayEvent::WorkResult {
                        request_id,
                        request_target,
                        status: ResultStatus::Error,
                        message: RelayError::NoAvailableWorker.to_string(),
                        content: None,
                    },
                });
                tracing::warn!(%request_id, "no available worker");
            }
        }
        Ok(())
    }

    /// Handles a `submit-result` event from a worker.
    ///
    /// Correlates the result with its pending request and routes a
    /// success `work-result` to the originating requester — or to every
    /// requester when result fan-out is enabled. Results bearing an
    /// unknown or already-resolved ID are dropped without a signal to
    /// anyone. Returns `true` if the result was routed.
    pub async fn submit_result(
        &self,
        request_id: RequestId,
        request_target: String,
        content: Option<serde_json::Value>,
    ) -> bool {
        match self.requests.complete(request_id).await {
            Some(pending) => {
                let delivery = if self.broadcast_results {
                    Delivery::Requesters
                } else {
                    Delivery::Connection(pending.origin)
                };
                self.event_bus.publish(OutboundEvent {
                    delivery,
                    event: RelayEvent::WorkResult {
                        request_id,
                        request_target,
                        status: ResultStatus::Success,
                        message: "Success".to_string(),
                        content,
                    },
                });
                tracing::info!(%request_id, origin = %pending.origin, "work result routed");
                true
            }
            None => {
                tracing::debug!(%request_id, "result for unknown request dropped");
                false
            }
        }
    }

    /// Number of currently tracked requester connections.
    pub async fn requester_count(&self) -> usize {
        self.requesters.len().await
    }

    /// Number of currently tracked worker connections.
    pub async fn worker_count(&self) -> usize {
        self.workers.len().await
    }

    /// Number of outstanding work requests.
    pub async fn pending_count(&self) -> usize {
        self.requests.len().await
    }
}
