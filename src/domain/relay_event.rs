//! Outbound relay events and their delivery addressing.
//!
//! Every dispatch decision produces a [`RelayEvent`] wrapped in an
//! [`OutboundEvent`] that names its destination. Events travel through the
//! [`super::EventBus`] to every connection loop; each loop forwards only
//! the events addressed to it.

use serde::Serialize;

use super::{ConnectionId, RequestId};

/// Outcome discriminator carried on every `work-result` event.
///
/// Serialized capitalized (`"Success"` / `"Error"`) to match the wire
/// contract requesters parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResultStatus {
    /// The worker produced a result.
    Success,
    /// The relay could not service the request.
    Error,
}

/// An event emitted by the dispatcher toward connected peers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum RelayEvent {
    /// A work item forwarded to one selected worker.
    WorkItem {
        /// Correlation token from the originating submission.
        request_id: RequestId,
        /// Opaque descriptor of the requested work.
        request_target: String,
    },

    /// A result routed back to the requester side.
    WorkResult {
        /// Correlation token from the originating submission.
        request_id: RequestId,
        /// Opaque descriptor of the requested work.
        request_target: String,
        /// Whether the exchange succeeded.
        status: ResultStatus,
        /// Human-readable outcome message.
        message: String,
        /// Worker-produced payload; `null` on error results.
        content: Option<serde_json::Value>,
    },
}

impl RelayEvent {
    /// Returns the request ID this event correlates to.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        match self {
            Self::WorkItem { request_id, .. } | Self::WorkResult { request_id, .. } => *request_id,
        }
    }

    /// Returns the wire event name as a static string slice.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::WorkItem { .. } => "work-item",
            Self::WorkResult { .. } => "work-result",
        }
    }
}

/// Destination of an outbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Exactly one connection, of either role.
    Connection(ConnectionId),
    /// Every connection that declared the requester role. Only used when
    /// result fan-out is explicitly enabled in configuration.
    Requesters,
}

/// A [`RelayEvent`] paired with its destination, as carried on the bus.
#[derive(Debug, Clone)]
pub struct OutboundEvent {
    /// Where the event should be forwarded.
    pub delivery: Delivery,
    /// The event itself.
    pub event: RelayEvent,
}
