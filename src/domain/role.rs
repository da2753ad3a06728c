//! Connection role discriminator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The two classes of relay connections.
///
/// A connection declares its role after the transport-level connect via
/// a `requester-connect` or `worker-connect` event; the role determines
/// which [`super::ConnectionRegistry`] tracks it and which fan-out events
/// it may receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionRole {
    /// Submits work items and receives results.
    Requester,
    /// Receives work items and returns results.
    Worker,
}

impl ConnectionRole {
    /// Returns the role as a static string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Requester => "requester",
            Self::Worker => "worker",
        }
    }
}

impl fmt::Display for ConnectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
