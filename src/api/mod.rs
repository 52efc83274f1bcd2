//! REST API layer: route handlers, DTOs, authentication, and router
//! composition.
//!
//! Device and voice-assistant endpoints live under `/api` behind the
//! shared-secret check. `/` and `/health` are public.

pub mod auth;
pub mod dto;
pub mod handlers;
pub mod openapi;

use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

/// Builds the routes without state: `/api` (authenticated), system
/// routes, and API documentation.
pub fn build_router(state: &AppState) -> Router<AppState> {
    let api = handlers::routes().layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_api_key,
    ));

    Router::new()
        .nest("/api", api)
        .merge(handlers::system::routes())
        .merge(openapi::routes())
}

/// Builds the complete application: routes, HTTP tracing, permissive
/// CORS, and injected state.
pub fn build_app(state: AppState) -> Router {
    build_router(&state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
