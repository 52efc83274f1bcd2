//! Impact event records as written to and read from the event store.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{HatId, ImpactSeverity, LightState};

/// A normalized reading ready to be appended to `impact_events`.
///
/// `created_at` is not part of the insert; the store assigns it.
#[derive(Debug, Clone, PartialEq)]
pub struct NewImpactEvent {
    /// Hat that produced the reading.
    pub hat_id: HatId,
    /// Canonical severity.
    pub impact: ImpactSeverity,
    /// Canonical (or passed-through) light label.
    pub light_state: LightState,
    /// Raw accelerometer magnitude, if reported.
    pub g_force: Option<f64>,
    /// Raw light sensor value, if reported.
    pub light_raw: Option<f64>,
}

/// A full row from the `impact_events` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredImpactEvent {
    /// Auto-increment row ID.
    pub id: i64,
    /// Owning hat.
    pub hat_id: HatId,
    /// Stored severity code (`0..=3`).
    pub impact: i32,
    /// Stored light label.
    pub light_state: String,
    /// Raw accelerometer magnitude.
    pub g_force: Option<f64>,
    /// Raw light sensor value.
    pub light_raw: Option<f64>,
    /// Server-assigned insert timestamp.
    pub created_at: DateTime<Utc>,
}

/// The latest reading as served to the voice assistant.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EventSnapshot {
    /// Severity code (`0` none, `1` light, `2` hard, `3` severe).
    pub impact: i32,
    /// Light label.
    pub light_state: String,
    /// Raw accelerometer magnitude.
    pub g_force: Option<f64>,
    /// Raw light sensor value.
    pub light_raw: Option<f64>,
    /// When the reading was recorded.
    pub created_at: DateTime<Utc>,
}

impl From<StoredImpactEvent> for EventSnapshot {
    fn from(event: StoredImpactEvent) -> Self {
        Self {
            impact: event.impact,
            light_state: event.light_state,
            g_force: event.g_force,
            light_raw: event.light_raw,
            created_at: event.created_at,
        }
    }
}

/// One row of the hat ⋈ event listing.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EventWithOwner {
    /// Hat display name.
    pub nickname: Option<String>,
    /// Person wearing the hat.
    pub owner_name: Option<String>,
    /// Severity code.
    pub impact: i32,
    /// Light label.
    pub light_state: String,
    /// Raw accelerometer magnitude.
    pub g_force: Option<f64>,
    /// When the reading was recorded.
    pub created_at: DateTime<Utc>,
}
