//! Event history DTOs.

use serde::Serialize;
use utoipa::ToSchema;

/// Response body for `DELETE /api/events`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClearEventsResponse {
    /// Confirmation message.
    pub message: String,
    /// Number of events removed.
    pub deleted: u64,
}

impl ClearEventsResponse {
    /// Builds the response for `deleted` removed events.
    #[must_use]
    pub fn new(deleted: u64) -> Self {
        Self {
            message: "Helmet impact history cleared".to_string(),
            deleted,
        }
    }
}
