//! Relay error types with wire code and HTTP status mapping.
//!
//! [`RelayError`] is the central error type for the relay. Each variant
//! carries a numeric code used both in REST error responses and in the
//! WebSocket error envelope sent back to a misbehaving peer.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::domain::RequestId;

/// Structured JSON error response body.
///
/// All REST error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1001,
///     "message": "invalid message: malformed JSON",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`RelayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with wire code and HTTP status mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Availability    | 503 Service Unavailable    |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// No worker connection is currently live.
    ///
    /// Surfaced to the submitting requester as a `work-result` event with
    /// status `Error`; never retried automatically.
    #[error("No available worker")]
    NoAvailableWorker,

    /// A work submission reused a request ID that is still pending.
    #[error("duplicate request id: {0}")]
    DuplicateRequestId(RequestId),

    /// An inbound WebSocket message could not be understood.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RelayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidMessage(_) => 1001,
            Self::DuplicateRequestId(_) => 1002,
            Self::NoAvailableWorker => 2001,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidMessage(_) | Self::DuplicateRequestId(_) => StatusCode::BAD_REQUEST,
            Self::NoAvailableWorker => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
