//! Service configuration loaded from environment variables.
//!
//! All settings come from the environment (or a `.env` file via
//! `dotenvy`). Database connection parts follow the `DB_*` convention
//! used by the device deployment; `DATABASE_URL` overrides them.

use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::PgConnectOptions;

use crate::domain::HatId;

/// Errors raised while reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `LISTEN_ADDR` or `PORT` could not be parsed.
    #[error("invalid listen address: {0}")]
    ListenAddr(String),

    /// `STORAGE_BACKEND` names an unknown backend.
    #[error("unknown storage backend: {0} (expected `postgres` or `memory`)")]
    StorageBackend(String),

    /// `LOG_FORMAT` names an unknown format.
    #[error("unknown log format: {0} (expected `text` or `json`)")]
    LogFormat(String),

    /// `DB_MAX_CONNECTIONS` is zero; the pool needs at least one slot.
    #[error("DB_MAX_CONNECTIONS must be at least 1")]
    MaxConnections,

    /// `DATABASE_URL` is not a valid PostgreSQL connection string.
    #[error("invalid DATABASE_URL: {0}")]
    DatabaseUrl(#[source] sqlx::Error),
}

/// Which event store backend to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL via `sqlx`.
    Postgres,
    /// In-process store; data is lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::StorageBackend(s.to_string())),
        }
    }
}

/// Tracing output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::LogFormat(s.to_string())),
        }
    }
}

/// Connection settings for the PostgreSQL store.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection string; takes precedence over the parts below.
    pub url: Option<String>,
    /// Database host.
    pub host: String,
    /// Database port.
    pub port: u16,
    /// Login role.
    pub user: String,
    /// Login password.
    pub password: String,
    /// Database name.
    pub name: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
    /// How long a request waits for a free connection.
    pub acquire_timeout: Duration,
    /// Apply embedded migrations at startup.
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Builds `sqlx` connect options from the URL or the individual parts.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DatabaseUrl`] if `url` is set but malformed.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = &self.url {
            return url.parse().map_err(ConfigError::DatabaseUrl);
        }
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.name);
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        Ok(options)
    }
}

/// Top-level service configuration.
///
/// Loaded once at startup via [`AppConfig::from_env`].
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Socket address the HTTP server binds to.
    pub listen_addr: SocketAddr,
    /// Shared secret expected in the `x-api-key` header. When `None`,
    /// every `/api` request is rejected.
    pub api_key: Option<String>,
    /// Hat every request reads and writes.
    pub hat_id: HatId,
    /// Event store backend.
    pub storage_backend: StorageBackend,
    /// PostgreSQL settings (also used for the memory backend's pool bound).
    pub database: DatabaseConfig,
    /// Tracing output format.
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `LISTEN_ADDR`/`PORT`,
    /// `STORAGE_BACKEND`, `LOG_FORMAT` or `DB_MAX_CONNECTIONS` hold
    /// unusable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let listen_addr = match env_var("LISTEN_ADDR") {
            Some(addr) => addr
                .parse()
                .map_err(|_| ConfigError::ListenAddr(addr.clone()))?,
            None => {
                let port = env_var("PORT").unwrap_or_else(|| "10000".to_string());
                let port: u16 = port
                    .parse()
                    .map_err(|_| ConfigError::ListenAddr(format!("port {port}")))?;
                SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
            }
        };

        let api_key = env_var("API_KEY");
        let hat_id = HatId::new(parse_env("HAT_ID", HatId::DEFAULT.get()));

        let storage_backend = env_var("STORAGE_BACKEND")
            .map_or(Ok(StorageBackend::Postgres), |v| v.parse())?;
        let log_format = env_var("LOG_FORMAT").map_or(Ok(LogFormat::Text), |v| v.parse())?;

        let database = DatabaseConfig {
            url: env_var("DATABASE_URL"),
            host: env_var("DB_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: parse_env("DB_PORT", 5432),
            user: env_var("DB_USER").unwrap_or_else(|| "hardhat".to_string()),
            password: env_var("DB_PASSWORD").unwrap_or_default(),
            name: env_var("DB_NAME").unwrap_or_else(|| "hardhat".to_string()),
            max_connections: pool_size(parse_env("DB_MAX_CONNECTIONS", 10))?,
            acquire_timeout: Duration::from_secs(parse_env("DB_ACQUIRE_TIMEOUT_SECS", 5)),
            run_migrations: parse_env_bool("RUN_MIGRATIONS", true),
        };

        Ok(Self {
            listen_addr,
            api_key,
            hat_id,
            storage_backend,
            database,
            log_format,
        })
    }
}

/// Reads an environment variable, treating empty values as unset.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    env_var(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Rejects an empty connection pool.
fn pool_size(max_connections: u32) -> Result<u32, ConfigError> {
    if max_connections == 0 {
        Err(ConfigError::MaxConnections)
    } else {
        Ok(max_connections)
    }
}

/// Parses an environment variable as a boolean. Accepts `"true"`, `"1"`,
/// `"false"`, `"0"` (case-insensitive). Returns `default` otherwise.
fn parse_env_bool(key: &str, default: bool) -> bool {
    match env_var(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("true" | "1") => true,
        Some("false" | "0") => false,
        _ => default,
    }
}
