//! Hard hat profile handler.

use axum::extract::State;
use axum::routing::put;
use axum::{Json, Router};

use crate::api::dto::{LenientJson, UpdateHatRequest, UpdateHatResponse};
use crate::app_state::AppState;
use crate::domain::HatProfileUpdate;
use crate::error::{ErrorResponse, HardhatError};

/// `PUT /api/hardhat`: Update the hat's nickname and/or owner.
///
/// # Errors
///
/// Returns [`HardhatError::InvalidBody`] for a malformed body, or
/// [`HardhatError::StorageFailure`] if the update fails.
#[utoipa::path(
    put,
    path = "/api/hardhat",
    tag = "Hard Hat",
    summary = "Update hat profile",
    description = "Overwrites the provided display fields. Reports success even when no hat row matched.",
    request_body = UpdateHatRequest,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Profile updated", body = UpdateHatResponse),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 401, description = "Missing or wrong API key", body = ErrorResponse),
        (status = 500, description = "Database update failed", body = ErrorResponse),
    )
)]
pub async fn update_hat(
    State(state): State<AppState>,
    LenientJson(req): LenientJson<UpdateHatRequest>,
) -> Result<Json<UpdateHatResponse>, HardhatError> {
    let update = HatProfileUpdate::from(req);
    state.telemetry.update_hat(&update).await?;
    Ok(Json(UpdateHatResponse { updated: true }))
}

/// Hat profile routes, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new().route("/hardhat", put(update_hat))
}
