//! API error types with HTTP status code mapping.
//!
//! [`HardhatError`] is the central error type for request handling. Each
//! variant maps to an HTTP status and a flat `{"error": "..."}` body.
//! Storage failures keep their diagnostic source for the server log only;
//! the client sees a generic message.

use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::persistence::StoreError;

/// JSON error response body.
///
/// ```json
/// { "error": "Unauthorized" }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
}

/// Store operation that failed, used to pick the client-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    /// Appending an event.
    Insert,
    /// Reading events or hats.
    Read,
    /// Clearing event history.
    Delete,
    /// Updating a hat profile.
    Update,
}

impl StoreOp {
    /// Generic message returned to clients for a failure of this operation.
    #[must_use]
    pub const fn public_message(self) -> &'static str {
        match self {
            Self::Insert => "Database insert failed",
            Self::Read => "Database read failed",
            Self::Delete => "Database delete failed",
            Self::Update => "Database update failed",
        }
    }
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Insert => "insert",
            Self::Read => "read",
            Self::Delete => "delete",
            Self::Update => "update",
        };
        f.write_str(name)
    }
}

/// Request-level error.
#[derive(Debug, thiserror::Error)]
pub enum HardhatError {
    /// Shared-secret header missing or wrong.
    #[error("Unauthorized")]
    Unauthorized,

    /// A required request field was absent.
    #[error("{0}")]
    MissingField(&'static str),

    /// The request body is not a JSON object.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The event store could not complete the operation.
    #[error("storage {op} failed: {source}")]
    StorageFailure {
        /// Operation being attempted.
        op: StoreOp,
        /// Underlying store error.
        #[source]
        source: StoreError,
    },
}

impl HardhatError {
    /// Wraps a store error for the given operation.
    #[must_use]
    pub const fn storage(op: StoreOp, source: StoreError) -> Self {
        Self::StorageFailure { op, source }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MissingField(_) | Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::StorageFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Never includes store internals.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Unauthorized => "Unauthorized".to_string(),
            Self::MissingField(message) => (*message).to_string(),
            Self::InvalidBody(_) => "Invalid JSON body".to_string(),
            Self::StorageFailure { op, .. } => op.public_message().to_string(),
        }
    }
}

impl IntoResponse for HardhatError {
    fn into_response(self) -> Response {
        match &self {
            Self::StorageFailure { op, source } => {
                tracing::error!(%op, error = %source, "event store operation failed");
            }
            Self::InvalidBody(detail) => {
                tracing::debug!(%detail, "rejected request body");
            }
            Self::Unauthorized | Self::MissingField(_) => {}
        }

        let status = self.status_code();
        let body = ErrorResponse {
            error: self.public_message(),
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
