//! OpenAPI document and its routes.
//!
//! The JSON document is served at `/api-docs/openapi.json`. With the
//! `swagger-ui` feature, an interactive UI is mounted at `/swagger-ui`.

use axum::Router;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use super::auth::API_KEY_HEADER;
use super::dto::{
    ClearEventsResponse, EmptyObject, LatestEventResponse, RecordImpactRequest,
    RecordImpactResponse, UpdateHatRequest, UpdateHatResponse,
};
use super::handlers;
use crate::app_state::AppState;
use crate::domain::{EventSnapshot, EventWithOwner};
use crate::error::ErrorResponse;

/// Path of the generated OpenAPI document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// OpenAPI description of the HTTP surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "Smart Hard Hat API",
        description = "Impact and light telemetry ingestion for the smart hard hat, and retrieval for the voice assistant."
    ),
    paths(
        handlers::system::health_handler,
        handlers::impact::record_impact,
        handlers::impact::latest_impact,
        handlers::events::list_events,
        handlers::events::clear_events,
        handlers::hardhat::update_hat,
    ),
    components(schemas(
        RecordImpactRequest,
        RecordImpactResponse,
        LatestEventResponse,
        EmptyObject,
        EventSnapshot,
        EventWithOwner,
        ClearEventsResponse,
        UpdateHatRequest,
        UpdateHatResponse,
        ErrorResponse,
        handlers::system::HealthResponse,
    )),
    modifiers(&ApiKeySecurity),
    tags(
        (name = "System", description = "Liveness"),
        (name = "Impact", description = "Reading ingestion and latest reading"),
        (name = "Events", description = "Event history"),
        (name = "Hard Hat", description = "Hat profile"),
    )
)]
pub struct ApiDoc;

/// Registers the `x-api-key` header scheme referenced by `/api` paths.
#[derive(Debug)]
struct ApiKeySecurity;

impl Modify for ApiKeySecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(API_KEY_HEADER))),
        );
    }
}

/// Documentation routes with Swagger UI.
#[cfg(feature = "swagger-ui")]
pub fn routes() -> Router<AppState> {
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, ApiDoc::openapi()))
}

/// Documentation routes serving the raw document.
#[cfg(not(feature = "swagger-ui"))]
pub fn routes() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    Router::new().route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_endpoint() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/impact",
            "/api/impact/latest",
            "/api/events",
            "/api/hardhat",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn api_key_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let has_scheme = doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("api_key"));
        assert!(has_scheme);
    }
}
