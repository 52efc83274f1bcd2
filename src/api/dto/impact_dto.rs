//! Impact ingestion and latest-reading DTOs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::common_dto::{lenient_number, present};
use crate::domain::EventSnapshot;
use crate::service::{RawReading, RecordedEvent};

/// Request body for `POST /api/impact`.
///
/// `impact` and `light` are required to be present but may hold any
/// JSON value; normalization decides what gets stored.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RecordImpactRequest {
    /// Impact as a code (`0`–`3`), numeric string, or label
    /// (`"none"`, `"light"`, `"hard"`, `"severe"`).
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Object)]
    pub impact: Option<Value>,
    /// Light label (`"dark"`, `"bright"`, `"normal"`, `"none"`).
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Object)]
    pub light: Option<Value>,
    /// Raw accelerometer magnitude.
    #[serde(default, deserialize_with = "lenient_number")]
    pub g_force: Option<f64>,
    /// Raw light sensor reading.
    #[serde(default, deserialize_with = "lenient_number")]
    pub light_raw: Option<f64>,
}

impl From<RecordImpactRequest> for RawReading {
    fn from(req: RecordImpactRequest) -> Self {
        Self {
            impact: req.impact,
            light: req.light,
            g_force: req.g_force,
            light_raw: req.light_raw,
        }
    }
}

/// Response body for `POST /api/impact` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordImpactResponse {
    /// Confirmation message.
    pub message: String,
    /// Row ID of the stored event.
    pub id: i64,
    /// Stored severity code.
    pub impact: i32,
    /// Stored light label.
    pub light_state: String,
}

impl From<RecordedEvent> for RecordImpactResponse {
    fn from(event: RecordedEvent) -> Self {
        Self {
            message: "Impact event recorded".to_string(),
            id: event.id,
            impact: event.impact.code(),
            light_state: event.light_state.as_str().to_string(),
        }
    }
}

/// Serialized as `{}`.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
pub struct EmptyObject {}

/// Response body for `GET /api/impact/latest` and `GET /api/latest`:
/// the latest reading, or `{}` when none has been recorded.
#[derive(Debug, Serialize, ToSchema)]
#[serde(untagged)]
pub enum LatestEventResponse {
    /// Most recent reading.
    Event(EventSnapshot),
    /// No readings yet.
    Empty(EmptyObject),
}

impl From<Option<EventSnapshot>> for LatestEventResponse {
    fn from(snapshot: Option<EventSnapshot>) -> Self {
        snapshot.map_or(Self::Empty(EmptyObject {}), Self::Event)
    }
}
