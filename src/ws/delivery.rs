//! Per-connection delivery filter.
//!
//! Every connection loop observes the full event bus; the filter decides
//! which [`Delivery`] addresses apply to this connection so only its own
//! traffic is forwarded down the socket.

use crate::domain::{ConnectionId, ConnectionRole, Delivery};

/// Decides which outbound events a single WebSocket connection receives.
#[derive(Debug)]
pub struct DeliveryFilter {
    /// Transport-assigned identity of this connection.
    connection_id: ConnectionId,
    /// Role the peer declared, if any. Undeclared connections receive
    /// unicast traffic only.
    role: Option<ConnectionRole>,
}

impl DeliveryFilter {
    /// Creates a filter for a freshly upgraded connection with no role.
    #[must_use]
    pub fn new(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            role: None,
        }
    }

    /// Records the role the peer declared. A repeat declaration (reconnect
    /// semantics) replaces the previous one.
    pub fn declare(&mut self, role: ConnectionRole) {
        self.role = Some(role);
    }

    /// Returns the declared role, if any.
    #[must_use]
    pub const fn role(&self) -> Option<ConnectionRole> {
        self.role
    }

    /// Returns `true` if an event with the given delivery address should
    /// be forwarded to this connection.
    #[must_use]
    pub fn matches(&self, delivery: Delivery) -> bool {
        match delivery {
            Delivery::Connection(id) => id == self.connection_id,
            Delivery::Requesters => self.role == Some(ConnectionRole::Requester),
        }
    }
}
