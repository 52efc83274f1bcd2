//! Impact ingestion and latest-reading handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    LatestEventResponse, LenientJson, RecordImpactRequest, RecordImpactResponse,
};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, HardhatError};

/// `POST /api/impact`: Record one sensor reading from the device.
///
/// # Errors
///
/// Returns [`HardhatError::MissingField`] when `impact` or `light` is
/// absent, or [`HardhatError::StorageFailure`] if the insert fails.
#[utoipa::path(
    post,
    path = "/api/impact",
    tag = "Impact",
    summary = "Record an impact reading",
    description = "Normalizes the impact severity and light state, then appends one event. Duplicate submissions are stored as separate events.",
    request_body = RecordImpactRequest,
    security(("api_key" = [])),
    responses(
        (status = 201, description = "Event recorded", body = RecordImpactResponse),
        (status = 400, description = "Missing impact or light", body = ErrorResponse),
        (status = 401, description = "Missing or wrong API key", body = ErrorResponse),
        (status = 500, description = "Database insert failed", body = ErrorResponse),
    )
)]
pub async fn record_impact(
    State(state): State<AppState>,
    LenientJson(req): LenientJson<RecordImpactRequest>,
) -> Result<impl IntoResponse, HardhatError> {
    let recorded = state.telemetry.record_event(req.into()).await?;
    Ok((StatusCode::CREATED, Json(RecordImpactResponse::from(recorded))))
}

/// `GET /api/impact/latest`: Most recent reading, or `{}`.
///
/// Also served at `GET /api/latest` for older voice-assistant builds.
///
/// # Errors
///
/// Returns [`HardhatError::StorageFailure`] if the read fails.
#[utoipa::path(
    get,
    path = "/api/impact/latest",
    tag = "Impact",
    summary = "Latest reading",
    description = "Returns the most recently recorded reading, or an empty object when there is none. `/api/latest` is an alias.",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Latest reading or `{}`", body = LatestEventResponse),
        (status = 401, description = "Missing or wrong API key", body = ErrorResponse),
        (status = 500, description = "Database read failed", body = ErrorResponse),
    )
)]
pub async fn latest_impact(
    State(state): State<AppState>,
) -> Result<Json<LatestEventResponse>, HardhatError> {
    let latest = state.telemetry.latest_event().await?;
    Ok(Json(LatestEventResponse::from(latest)))
}

/// Impact routes, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/impact", post(record_impact))
        .route("/impact/latest", get(latest_impact))
        .route("/latest", get(latest_impact))
}
