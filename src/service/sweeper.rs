//! Periodic liveness sweep task.
//!
//! One sweeper runs per [`ConnectionRegistry`], independent of request
//! traffic, for the lifetime of the process. Each tick evicts entries
//! whose heartbeat has aged past the liveness timeout.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::domain::ConnectionRegistry;

/// Runs the sweep loop until `cancel` fires.
///
/// The interval uses [`MissedTickBehavior::Skip`]: when the runtime is
/// busy and a tick is missed or delayed, the sweep simply retries on the
/// next tick. Scheduling hiccups never terminate the task — eviction
/// latency is bounded by roughly one interval beyond the timeout as long
/// as the interval stays well below it.
pub async fn run_sweeper(
    registry: Arc<ConnectionRegistry>,
    interval: Duration,
    timeout: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let evicted = registry.sweep(Instant::now(), timeout).await;
                for connection_id in evicted {
                    tracing::info!(
                        %connection_id,
                        role = %registry.role(),
                        "connection evicted after missed heartbeats"
                    );
                }
            }
            () = cancel.cancelled() => {
                tracing::debug!(role = %registry.role(), "sweeper stopped");
                return;
            }
        }
    }
}
