//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::TelemetryService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Telemetry service for all business logic.
    pub telemetry: Arc<TelemetryService>,
    /// Shared secret expected in the `x-api-key` header. `None` rejects
    /// every protected request.
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    /// Builds the state from a service and the configured key.
    #[must_use]
    pub fn new(telemetry: TelemetryService, api_key: Option<String>) -> Self {
        Self {
            telemetry: Arc::new(telemetry),
            api_key: api_key.map(Arc::from),
        }
    }
}
