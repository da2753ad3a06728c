//! WebSocket layer: connection handling, message parsing, event delivery.
//!
//! The WebSocket endpoint at `/ws` carries the relay's entire peer
//! protocol: role declaration, heartbeats, work submission, and result
//! delivery.

pub mod connection;
pub mod delivery;
pub mod handler;
pub mod messages;
