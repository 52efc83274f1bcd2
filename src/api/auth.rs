//! Shared-secret authentication for `/api` routes.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::app_state::AppState;
use crate::error::HardhatError;

/// Header carrying the pre-shared key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Returns `true` when `presented` matches `expected` byte for byte.
/// A deployment without a configured key accepts nothing.
#[must_use]
pub fn key_matches(expected: Option<&str>, presented: Option<&[u8]>) -> bool {
    match (expected, presented) {
        (Some(expected), Some(presented)) => expected.as_bytes() == presented,
        _ => false,
    }
}

/// Axum middleware rejecting requests without the configured `x-api-key`.
///
/// Runs before routing inside `/api`, so rejected requests never reach a
/// handler or the event store.
///
/// # Errors
///
/// Returns [`HardhatError::Unauthorized`] when the header is missing or
/// does not match.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, HardhatError> {
    let authorized = key_matches(
        state.api_key.as_deref(),
        request
            .headers()
            .get(API_KEY_HEADER)
            .map(|value| value.as_bytes()),
    );

    if !authorized {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "rejected request without valid api key"
        );
        return Err(HardhatError::Unauthorized);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_key_is_accepted() {
        assert!(key_matches(Some("s3cret"), Some(b"s3cret")));
    }

    #[test]
    fn wrong_or_missing_key_is_rejected() {
        assert!(!key_matches(Some("s3cret"), Some(b"S3CRET")));
        assert!(!key_matches(Some("s3cret"), Some(b"s3cret ")));
        assert!(!key_matches(Some("s3cret"), Some(b"")));
        assert!(!key_matches(Some("s3cret"), None));
    }

    #[test]
    fn unconfigured_key_rejects_everything() {
        assert!(!key_matches(None, Some(b"anything")));
        assert!(!key_matches(None, None));
    }
}
