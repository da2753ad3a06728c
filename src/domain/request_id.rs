//! Type-safe work request identifier.
//!
//! [`RequestId`] is a newtype wrapper around [`uuid::Uuid`]. Unlike
//! [`super::ConnectionId`], request identifiers are supplied by the
//! requester with each submission and must be unique among currently
//! pending requests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a work request.
///
/// Caller-supplied correlation token: a requester generates it when
/// submitting work, the relay echoes it on the `work-item` event, and the
/// worker returns it with the result so the relay can route the response
/// back to the originating requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(uuid::Uuid);

impl RequestId {
    /// Creates a new random `RequestId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Creates a `RequestId` from an existing [`uuid::Uuid`].
    #[must_use]
    pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<uuid::Uuid> for RequestId {
    fn from(uuid: uuid::Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RequestId> for uuid::Uuid {
    fn from(id: RequestId) -> Self {
        id.0
    }
}
