//! Event history handlers: joined listing and bulk clear.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::ClearEventsResponse;
use crate::app_state::AppState;
use crate::domain::EventWithOwner;
use crate::error::{ErrorResponse, HardhatError};

/// `GET /api/events`: Every event with its hat's nickname and owner.
///
/// # Errors
///
/// Returns [`HardhatError::StorageFailure`] if the read fails.
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Events",
    summary = "List events",
    description = "Returns all recorded events joined with their hat profile, most recent first.",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Events, newest first", body = Vec<EventWithOwner>),
        (status = 401, description = "Missing or wrong API key", body = ErrorResponse),
        (status = 500, description = "Database read failed", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventWithOwner>>, HardhatError> {
    Ok(Json(state.telemetry.list_events().await?))
}

/// `DELETE /api/events`: Irreversibly clear the hat's impact history.
///
/// # Errors
///
/// Returns [`HardhatError::StorageFailure`] if the delete fails.
#[utoipa::path(
    delete,
    path = "/api/events",
    tag = "Events",
    summary = "Clear event history",
    description = "Deletes every event recorded for the hat. Clearing an empty history succeeds.",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "History cleared", body = ClearEventsResponse),
        (status = 401, description = "Missing or wrong API key", body = ErrorResponse),
        (status = 500, description = "Database delete failed", body = ErrorResponse),
    )
)]
pub async fn clear_events(
    State(state): State<AppState>,
) -> Result<Json<ClearEventsResponse>, HardhatError> {
    let deleted = state.telemetry.clear_events().await?;
    Ok(Json(ClearEventsResponse::new(deleted)))
}

/// Event history routes, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/events", get(list_events).delete(clear_events))
}
