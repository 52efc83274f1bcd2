//! REST endpoint handlers organized by resource.

pub mod events;
pub mod hardhat;
pub mod impact;
pub mod system;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router};

use crate::app_state::AppState;
use crate::error::ErrorResponse;

/// Composes all protected resource routes, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(impact::routes())
        .merge(events::routes())
        .merge(hardhat::routes())
        .fallback(api_not_found)
}

/// Fallback for unknown paths under `/api`.
async fn api_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Not found".to_string(),
        }),
    )
}
