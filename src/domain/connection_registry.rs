//! Liveness-tracked connection storage for one connection role.
//!
//! [`ConnectionRegistry`] is the authoritative set of currently-live
//! connections of a single role. All entry access goes through the
//! registry's methods behind a [`tokio::sync::RwLock`]; nothing else ever
//! touches an entry directly, so the event-handling path and the periodic
//! sweep task cannot corrupt each other.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::{ConnectionId, ConnectionRole};

/// A single tracked connection.
///
/// Created on a `*-connect` event, refreshed by `*-heartbeat` events, and
/// deleted either by the sweep task or by explicit removal when the socket
/// closes.
#[derive(Debug, Clone)]
pub struct ConnectionEntry {
    /// Transport-assigned connection identifier.
    pub connection_id: ConnectionId,
    /// Monotonic timestamp of the most recent heartbeat. `None` until the
    /// connection proves liveness for the first time.
    pub last_heartbeat: Option<Instant>,
    /// Wall-clock registration time, for logs and stats.
    pub connected_at: DateTime<Utc>,
}

/// Authoritative store for connections of one role.
///
/// # Concurrency
///
/// - Heartbeats and registrations take the write lock briefly and never
///   suspend while holding it.
/// - The sweep task collects evictions under the write lock in a single
///   pass; there is no iterate-while-mutating window.
/// - The requester and worker registries are independent lock domains.
#[derive(Debug)]
pub struct ConnectionRegistry {
    role: ConnectionRole,
    entries: RwLock<HashMap<ConnectionId, ConnectionEntry>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry for the given role.
    #[must_use]
    pub fn new(role: ConnectionRole) -> Self {
        Self {
            role,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the role this registry tracks.
    #[must_use]
    pub const fn role(&self) -> ConnectionRole {
        self.role
    }

    /// Registers a connection with no heartbeat recorded yet.
    ///
    /// Registering an already-present ID overwrites the existing entry:
    /// the transport guarantees IDs are unique per live socket, so a
    /// collision can only mean a reconnect.
    pub async fn register(&self, connection_id: ConnectionId) {
        let entry = ConnectionEntry {
            connection_id,
            last_heartbeat: None,
            connected_at: Utc::now(),
        };
        let mut map = self.entries.write().await;
        map.insert(connection_id, entry);
        tracing::info!(%connection_id, role = %self.role, "connection registered");
    }

    /// Refreshes the heartbeat timestamp of a registered connection.
    ///
    /// Returns `true` if the entry was present. A heartbeat for an absent
    /// ID (late, spurious, or post-eviction) is silently ignored. The
    /// stored timestamp never moves backwards.
    pub async fn heartbeat(&self, connection_id: ConnectionId, now: Instant) -> bool {
        let mut map = self.entries.write().await;
        if let Some(entry) = map.get_mut(&connection_id) {
            entry.last_heartbeat = Some(entry.last_heartbeat.map_or(now, |prev| prev.max(now)));
            tracing::trace!(%connection_id, role = %self.role, "heartbeat");
            true
        } else {
            tracing::debug!(%connection_id, role = %self.role, "heartbeat for unknown connection ignored");
            false
        }
    }

    /// Removes every entry whose heartbeat has aged past `timeout`.
    ///
    /// Entries that have never sent a heartbeat are exempt: the window
    /// between connect and first heartbeat is a grace period. Returns the
    /// evicted IDs so the caller can log them.
    pub async fn sweep(&self, now: Instant, timeout: Duration) -> Vec<ConnectionId> {
        let mut map = self.entries.write().await;
        let stale: Vec<ConnectionId> = map
            .values()
            .filter(|entry| {
                entry
                    .last_heartbeat
                    .is_some_and(|hb| now.saturating_duration_since(hb) >= timeout)
            })
            .map(|entry| entry.connection_id)
            .collect();
        for id in &stale {
            map.remove(id);
        }
        stale
    }

    /// Returns the ID of one live connection, or `None`.
    ///
    /// A connection is live when its heartbeat is set and younger than
    /// `timeout`. Among qualifying entries the one with the most recent
    /// heartbeat wins; ties break on the smallest connection ID so the
    /// choice is deterministic.
    pub async fn find_live(&self, now: Instant, timeout: Duration) -> Option<ConnectionId> {
        let map = self.entries.read().await;
        map.values()
            .filter_map(|entry| {
                entry
                    .last_heartbeat
                    .filter(|hb| now.saturating_duration_since(*hb) < timeout)
                    .map(|hb| (hb, entry.connection_id))
            })
            .max_by(|(hb_a, id_a), (hb_b, id_b)| hb_a.cmp(hb_b).then(id_b.cmp(id_a)))
            .map(|(_, id)| id)
    }

    /// Removes a connection, returning `true` if it was present.
    ///
    /// Called when the transport observes the socket closing; silent
    /// peers are still cleaned up by the sweep task.
    pub async fn remove(&self, connection_id: ConnectionId) -> bool {
        let mut map = self.entries.write().await;
        let removed = map.remove(&connection_id).is_some();
        if removed {
            tracing::info!(%connection_id, role = %self.role, "connection removed");
        }
        removed
    }

    /// Returns the number of tracked connections.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if the registry tracks no connections.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
