//! Live-worker selection.
//!
//! Stateless function over a [`ConnectionRegistry`] snapshot. Liveness is
//! the only admission criterion; no load-based or round-robin balancing.

use std::time::{Duration, Instant};

use crate::domain::{ConnectionId, ConnectionRegistry};

/// Picks one live worker connection to receive a work item.
///
/// Delegates to [`ConnectionRegistry::find_live`]: the qualifying worker
/// with the most recent heartbeat wins, ties broken on the smallest
/// connection ID. Returns `None` when no worker has proven liveness
/// within `timeout`.
pub async fn select_worker(
    registry: &ConnectionRegistry,
    now: Instant,
    timeout: Duration,
) -> Option<ConnectionId> {
    registry.find_live(now, timeout).await
}
