//! Broadcast channel for outbound relay events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. The dispatcher
//! publishes every [`OutboundEvent`] through the bus, and each WebSocket
//! connection loop subscribes once and forwards the events addressed to it.

use tokio::sync::broadcast;

use super::OutboundEvent;

/// Broadcast bus for [`OutboundEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity
/// (default 10 000). When the ring buffer is full, the oldest events are
/// dropped for lagging receivers — best-effort single delivery, per the
/// relay's contract.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<OutboundEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribed connection loops.
    ///
    /// Returns the number of receivers that received the event. With no
    /// active receivers the event is silently dropped — the addressee is
    /// gone and nobody else would forward it.
    pub fn publish(&self, event: OutboundEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a new receiver that will observe all future events.
    ///
    /// Each WebSocket connection calls this once at upgrade time.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<OutboundEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
