//! Outstanding work request storage and correlation.
//!
//! [`RequestTable`] tracks every submitted work item until its result
//! arrives. The table is the single correlation point between a
//! requester's submission and a worker's asynchronous response.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;

use super::{ConnectionId, RequestId};
use crate::error::RelayError;

/// Lifecycle state of a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Submitted, no result received yet.
    Waiting,
    /// A matching result arrived; the entry is on its way out of the table.
    Completed,
}

/// A work item awaiting its result.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    /// Requester-supplied correlation token.
    pub request_id: RequestId,
    /// Opaque descriptor of the requested work (e.g. a resource locator).
    pub request_target: String,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// The requester connection that submitted the work.
    pub origin: ConnectionId,
    /// Submission time, for logs and stats.
    pub submitted_at: DateTime<Utc>,
}

impl PendingRequest {
    /// Creates a new request in the `Waiting` state.
    #[must_use]
    pub fn new(request_id: RequestId, request_target: String, origin: ConnectionId) -> Self {
        Self {
            request_id,
            request_target,
            status: RequestStatus::Waiting,
            origin,
            submitted_at: Utc::now(),
        }
    }
}

/// Store for all outstanding work requests.
///
/// Entries are inserted on submission and removed when the first matching
/// result arrives, so completed identifiers may be reused and the table
/// cannot grow without bound from resolved traffic.
#[derive(Debug, Default)]
pub struct RequestTable {
    entries: RwLock<HashMap<RequestId, PendingRequest>>,
}

impl RequestTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a new pending request.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::DuplicateRequestId`] if an entry with the
    /// same ID is still pending. The live entry is left untouched.
    pub async fn insert(&self, pending: PendingRequest) -> Result<(), RelayError> {
        let mut map = self.entries.write().await;
        if map.contains_key(&pending.request_id) {
            return Err(RelayError::DuplicateRequestId(pending.request_id));
        }
        map.insert(pending.request_id, pending);
        Ok(())
    }

    /// Resolves a request, removing and returning its entry.
    ///
    /// Returns `None` for an unknown or already-resolved ID; the caller
    /// drops such results silently.
    pub async fn complete(&self, request_id: RequestId) -> Option<PendingRequest> {
        let mut map = self.entries.write().await;
        map.remove(&request_id).map(|mut pending| {
            pending.status = RequestStatus::Completed;
            pending
        })
    }

    /// Returns the number of outstanding requests.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Returns `true` if no requests are outstanding.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
