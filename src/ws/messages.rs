//! WebSocket wire protocol: inbound peer events and the error envelope.
//!
//! All messages are JSON objects discriminated by an `"event"` field.
//! Outbound relay traffic (`work-item`, `work-result`) serializes directly
//! from [`crate::domain::RelayEvent`]; this module covers what peers send
//! and the error envelope the relay answers with.

use serde::{Deserialize, Serialize};

use crate::domain::RequestId;

/// Events a connected peer can send over WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Declares this connection as a worker.
    WorkerConnect,
    /// Declares this connection as a requester.
    RequesterConnect,
    /// Proves liveness of a worker connection.
    WorkerHeartbeat,
    /// Proves liveness of a requester connection.
    RequesterHeartbeat,
    /// Submits a work item for dispatch.
    SubmitWork {
        /// Requester-generated correlation token.
        request_id: RequestId,
        /// Opaque descriptor of the requested work.
        request_target: String,
    },
    /// Returns the result of a previously dispatched work item.
    SubmitResult {
        /// Correlation token from the `work-item` event.
        request_id: RequestId,
        /// Opaque descriptor echoed from the work item.
        request_target: String,
        /// Worker-produced payload.
        #[serde(default)]
        content: Option<serde_json::Value>,
    },
}

/// Non-relay messages the server sends to a single peer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// A peer's message was malformed or rejected.
    Error {
        /// Numeric error code (see [`crate::error::RelayError`]).
        code: u32,
        /// Human-readable error message.
        message: String,
    },
}
