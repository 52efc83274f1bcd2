//! System endpoints: root and health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    database: String,
    version: String,
    timestamp: String,
}

/// `GET /health`: Service health status. Also served at `GET /`.
///
/// Always answers 200 so the device can tell the API is up; store
/// reachability is reported in `database`.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service status, event store reachability, version, and current timestamp. No API key required.",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let database = if state.telemetry.store_available().await {
        "ok"
    } else {
        "unavailable"
    };
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "Smart Hard Hat API running".to_string(),
            database: database.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }),
    )
}

/// System routes mounted at the root level (outside `/api`, no auth).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
}
