//! Domain layer: core types, connection registries, and event system.
//!
//! This module contains the server-side domain model: connection and
//! request identity, the liveness-tracked connection registries, the
//! pending request table, and the event bus that carries outbound relay
//! events to connection loops.

pub mod connection_id;
pub mod connection_registry;
pub mod event_bus;
pub mod relay_event;
pub mod request_id;
pub mod request_table;
pub mod role;

pub use connection_id::ConnectionId;
pub use connection_registry::{ConnectionEntry, ConnectionRegistry};
pub use event_bus::EventBus;
pub use relay_event::{Delivery, OutboundEvent, RelayEvent, ResultStatus};
pub use request_id::RequestId;
pub use request_table::{PendingRequest, RequestStatus, RequestTable};
pub use role::ConnectionRole;
