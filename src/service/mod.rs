//! Service layer: business logic orchestration.
//!
//! [`TelemetryService`] normalizes incoming readings and drives the
//! [`crate::persistence::EventStore`].

pub mod telemetry_service;

pub use telemetry_service::{RawReading, RecordedEvent, TelemetryService};
