//! hardhat-telemetry server entry point.
//!
//! Loads configuration, opens the event store, and serves the HTTP API.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use hardhat_telemetry::api;
use hardhat_telemetry::app_state::AppState;
use hardhat_telemetry::config::{AppConfig, LogFormat, StorageBackend};
use hardhat_telemetry::domain::HardHat;
use hardhat_telemetry::persistence::{EventStore, MemoryStore, PostgresStore};
use hardhat_telemetry::service::TelemetryService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::from_env().context("invalid configuration")?;

    // Initialize tracing
    init_tracing(config.log_format);
    tracing::info!(
        addr = %config.listen_addr,
        hat_id = %config.hat_id,
        "starting hardhat-telemetry"
    );

    if config.api_key.is_none() {
        tracing::warn!("API_KEY is not set; every /api request will be rejected");
    }

    // Build persistence layer
    let store = open_store(&config).await?;
    tracing::info!(
        backend = store.backend_name(),
        max_connections = config.database.max_connections,
        "event store ready"
    );

    // Build service layer and application state
    let telemetry = TelemetryService::new(store, config.hat_id);
    let app_state = AppState::new(telemetry, config.api_key.clone());

    let app = api::build_app(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

async fn open_store(config: &AppConfig) -> anyhow::Result<EventStore> {
    let db = &config.database;
    match config.storage_backend {
        StorageBackend::Postgres => {
            let options = db.connect_options()?;
            let store =
                PostgresStore::connect_lazy(options, db.max_connections, db.acquire_timeout);
            if db.run_migrations {
                store
                    .migrate()
                    .await
                    .context("failed to apply database migrations")?;
                tracing::info!("database migrations applied");
            }
            Ok(EventStore::from(store))
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory event store; readings are lost on restart");
            let hat = HardHat::new(config.hat_id, Some("Hard Hat".to_string()), None);
            Ok(EventStore::from(MemoryStore::with_hats(
                [hat],
                db.max_connections,
                db.acquire_timeout,
            )))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
