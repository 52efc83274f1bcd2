//! # hardhat-telemetry
//!
//! Telemetry API for the smart hard hat: the device posts impact and
//! light readings, the service normalizes and stores them, and a voice
//! assistant polls for the latest one.
//!
//! ## Architecture
//!
//! ```text
//! Device / Voice assistant (HTTP + JSON)
//!     │
//!     ├── x-api-key middleware (api/auth)
//!     ├── REST Handlers (api/)
//!     │
//!     ├── TelemetryService (service/)
//!     ├── Normalizers (domain/)
//!     │
//!     └── EventStore (persistence/)
//!           ├── PostgreSQL (sqlx, bounded pool)
//!           └── Memory
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod service;
