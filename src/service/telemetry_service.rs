//! Telemetry service: records readings and serves them back.

use std::time::Duration;

use serde_json::Value;

use crate::domain::{
    EventSnapshot, EventWithOwner, HatId, HatProfileUpdate, ImpactSeverity, LightState,
    NewImpactEvent, normalize_impact, normalize_light,
};
use crate::error::{HardhatError, StoreOp};
use crate::persistence::EventStore;

/// Longest a health check waits on the store before reporting it down.
pub const HEALTH_PING_TIMEOUT: Duration = Duration::from_secs(1);

/// Message returned when a reading lacks `impact` or `light`.
pub const MISSING_READING_FIELDS: &str = "Missing impact or light";

/// A sensor reading as received from the device, before normalization.
///
/// `impact` and `light` distinguish "absent" (`None`) from an explicit
/// JSON `null` (`Some(Value::Null)`). Only absence is rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawReading {
    /// Raw impact value: number, numeric string, label, or `null`.
    pub impact: Option<Value>,
    /// Raw light label.
    pub light: Option<Value>,
    /// Raw accelerometer magnitude.
    pub g_force: Option<f64>,
    /// Raw light sensor value.
    pub light_raw: Option<f64>,
}

/// Outcome of a successful [`TelemetryService::record_event`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedEvent {
    /// Row ID assigned by the store.
    pub id: i64,
    /// Severity that was stored.
    pub impact: ImpactSeverity,
    /// Light state that was stored.
    pub light_state: LightState,
}

/// Orchestration layer for every API operation.
///
/// Holds the injected [`EventStore`] and the hat the deployment serves.
/// Each method is a single store call, so no cross-request coordination
/// is needed.
#[derive(Debug, Clone)]
pub struct TelemetryService {
    store: EventStore,
    hat_id: HatId,
}

impl TelemetryService {
    /// Creates a service over `store`, targeting `hat_id`.
    #[must_use]
    pub fn new(store: EventStore, hat_id: HatId) -> Self {
        Self { store, hat_id }
    }

    /// Normalizes a reading and appends it to the event store.
    ///
    /// Every call appends a new row; duplicates are not collapsed.
    ///
    /// # Errors
    ///
    /// Returns [`HardhatError::MissingField`] when `impact` or `light` is
    /// absent (nothing is written), or [`HardhatError::StorageFailure`]
    /// if the insert fails.
    pub async fn record_event(&self, reading: RawReading) -> Result<RecordedEvent, HardhatError> {
        let (Some(impact_raw), Some(light_raw_state)) = (&reading.impact, &reading.light) else {
            return Err(HardhatError::MissingField(MISSING_READING_FIELDS));
        };

        let event = NewImpactEvent {
            hat_id: self.hat_id,
            impact: normalize_impact(Some(impact_raw)),
            light_state: normalize_light(Some(light_raw_state)),
            g_force: reading.g_force,
            light_raw: reading.light_raw,
        };

        let id = self
            .store
            .insert_event(&event)
            .await
            .map_err(|e| HardhatError::storage(StoreOp::Insert, e))?;

        tracing::info!(
            event_id = id,
            hat_id = %event.hat_id,
            impact = event.impact.code(),
            light_state = %event.light_state,
            "impact event recorded"
        );
        if !event.light_state.is_canonical() {
            tracing::warn!(light_state = %event.light_state, "stored unrecognized light label");
        }

        Ok(RecordedEvent {
            id,
            impact: event.impact,
            light_state: event.light_state,
        })
    }

    /// Returns the most recent reading, or `None` if nothing has been
    /// recorded yet.
    ///
    /// # Errors
    ///
    /// Returns [`HardhatError::StorageFailure`] if the read fails.
    pub async fn latest_event(&self) -> Result<Option<EventSnapshot>, HardhatError> {
        let latest = self
            .store
            .latest_event(self.hat_id)
            .await
            .map_err(|e| HardhatError::storage(StoreOp::Read, e))?;

        tracing::debug!(hat_id = %self.hat_id, found = latest.is_some(), "latest event read");
        Ok(latest.map(EventSnapshot::from))
    }

    /// Deletes the hat's whole event history. Returns how many events
    /// were removed; clearing an empty history succeeds with `0`.
    ///
    /// # Errors
    ///
    /// Returns [`HardhatError::StorageFailure`] if the delete fails.
    pub async fn clear_events(&self) -> Result<u64, HardhatError> {
        let deleted = self
            .store
            .clear_events(Some(self.hat_id))
            .await
            .map_err(|e| HardhatError::storage(StoreOp::Delete, e))?;

        tracing::info!(hat_id = %self.hat_id, deleted, "impact history cleared");
        Ok(deleted)
    }

    /// Overwrites the hat's display fields.
    ///
    /// Succeeds even when no hat row matches; that case is only logged.
    ///
    /// # Errors
    ///
    /// Returns [`HardhatError::StorageFailure`] if the update fails.
    pub async fn update_hat(&self, update: &HatProfileUpdate) -> Result<(), HardhatError> {
        if update.is_empty() {
            tracing::debug!(hat_id = %self.hat_id, "hat profile update carries no fields");
        }

        let affected = self
            .store
            .update_hat(self.hat_id, update)
            .await
            .map_err(|e| HardhatError::storage(StoreOp::Update, e))?;

        if affected == 0 {
            tracing::warn!(hat_id = %self.hat_id, "hat profile update matched no rows");
        } else {
            tracing::info!(hat_id = %self.hat_id, "hat profile updated");
        }
        Ok(())
    }

    /// Lists every event joined with its hat's nickname and owner, most
    /// recent first.
    ///
    /// # Errors
    ///
    /// Returns [`HardhatError::StorageFailure`] if the read fails.
    pub async fn list_events(&self) -> Result<Vec<EventWithOwner>, HardhatError> {
        let rows = self
            .store
            .list_events_with_owner(None)
            .await
            .map_err(|e| HardhatError::storage(StoreOp::Read, e))?;

        tracing::debug!(count = rows.len(), "event listing read");
        Ok(rows)
    }

    /// Reports whether the store answers within [`HEALTH_PING_TIMEOUT`].
    pub async fn store_available(&self) -> bool {
        let backend = self.store.backend_name();
        match tokio::time::timeout(HEALTH_PING_TIMEOUT, self.store.ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!(backend, error = %e, "store ping failed");
                false
            }
            Err(_) => {
                tracing::warn!(backend, "store ping timed out");
                false
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::time::Instant;

    use serde_json::json;

    use super::*;
    use crate::domain::HardHat;
    use crate::persistence::{MemoryStore, StoreError};

    fn make_service() -> TelemetryService {
        TelemetryService::new(EventStore::from(MemoryStore::default()), HatId::DEFAULT)
    }

    fn reading(impact: Value, light: Value) -> RawReading {
        RawReading {
            impact: Some(impact),
            light: Some(light),
            g_force: None,
            light_raw: None,
        }
    }

    #[tokio::test]
    async fn record_normalizes_before_storing() {
        let service = make_service();
        let Ok(recorded) = service
            .record_event(RawReading {
                g_force: Some(4.5),
                light_raw: Some(812.0),
                ..reading(json!("Severe"), json!(" Dark "))
            })
            .await
        else {
            panic!("record failed");
        };
        assert_eq!(recorded.impact, ImpactSeverity::Severe);
        assert_eq!(recorded.light_state, LightState::Dark);

        let Ok(Some(latest)) = service.latest_event().await else {
            panic!("expected a latest event");
        };
        assert_eq!(latest.impact, 3);
        assert_eq!(latest.light_state, "dark");
        assert_eq!(latest.g_force, Some(4.5));
        assert_eq!(latest.light_raw, Some(812.0));
    }

    #[tokio::test]
    async fn explicit_null_fields_are_accepted() {
        let service = make_service();
        let Ok(recorded) = service.record_event(reading(Value::Null, Value::Null)).await else {
            panic!("null fields are present, not missing");
        };
        assert_eq!(recorded.impact, ImpactSeverity::None);
        assert_eq!(recorded.light_state, LightState::None);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected_and_nothing_is_stored() {
        let service = make_service();
        let cases = [
            RawReading {
                light: Some(json!("dark")),
                ..RawReading::default()
            },
            RawReading {
                impact: Some(json!(2)),
                ..RawReading::default()
            },
            RawReading::default(),
        ];
        for case in cases {
            let result = service.record_event(case).await;
            assert!(matches!(result, Err(HardhatError::MissingField(_))));
        }
        let Ok(None) = service.latest_event().await else {
            panic!("no event should have been stored");
        };
    }

    #[tokio::test]
    async fn latest_is_the_last_of_many() {
        let service = make_service();
        for impact in [json!(1), json!("hard"), json!(0), json!(2.6)] {
            let _ = service.record_event(reading(impact, json!("normal"))).await;
        }
        let Ok(rows) = service.list_events().await else {
            panic!("listing failed");
        };
        assert_eq!(rows.len(), 4);

        let Ok(Some(latest)) = service.latest_event().await else {
            panic!("expected a latest event");
        };
        let newest = rows.iter().map(|r| r.created_at).max();
        assert_eq!(Some(latest.created_at), newest);
        assert_eq!(latest.impact, 3);
    }

    #[tokio::test]
    async fn duplicate_submissions_all_persist() {
        let service = make_service();
        for _ in 0..3 {
            let _ = service.record_event(reading(json!(1), json!("bright"))).await;
        }
        let Ok(rows) = service.list_events().await else {
            panic!("listing failed");
        };
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn clear_then_latest_is_empty() {
        let service = make_service();
        let _ = service.record_event(reading(json!(2), json!("dark"))).await;
        let _ = service.record_event(reading(json!(3), json!("dark"))).await;

        assert_eq!(service.clear_events().await.ok(), Some(2));
        let Ok(None) = service.latest_event().await else {
            panic!("history should be empty");
        };
        assert_eq!(service.clear_events().await.ok(), Some(0));
    }

    #[tokio::test]
    async fn update_hat_is_reflected_in_listing() {
        let service = make_service();
        let _ = service.record_event(reading(json!(1), json!("normal"))).await;

        let update = HatProfileUpdate {
            nickname: Some("Site B".into()),
            owner_name: Some("Dana".into()),
        };
        assert!(service.update_hat(&update).await.is_ok());

        let Ok(rows) = service.list_events().await else {
            panic!("listing failed");
        };
        let [row] = rows.as_slice() else {
            panic!("expected one row");
        };
        assert_eq!(row.nickname.as_deref(), Some("Site B"));
        assert_eq!(row.owner_name.as_deref(), Some("Dana"));
    }

    #[tokio::test]
    async fn update_of_missing_hat_still_succeeds() {
        let store = MemoryStore::new(2, Duration::from_millis(50));
        let service = TelemetryService::new(EventStore::from(store), HatId::new(5));
        let update = HatProfileUpdate {
            nickname: Some("Nobody".into()),
            owner_name: None,
        };
        assert!(service.update_hat(&update).await.is_ok());
    }

    #[tokio::test]
    async fn store_failure_surfaces_as_storage_failure() {
        let store = MemoryStore::with_hats(
            [HardHat::new(HatId::new(2), None, None)],
            2,
            Duration::from_millis(50),
        );
        let service = TelemetryService::new(EventStore::from(store), HatId::DEFAULT);
        let result = service.record_event(reading(json!(1), json!("dark"))).await;
        let Err(HardhatError::StorageFailure { op, source }) = result else {
            panic!("expected a storage failure");
        };
        assert_eq!(op, StoreOp::Insert);
        assert!(matches!(source, StoreError::ForeignKey(_)));
    }

    #[tokio::test]
    async fn empty_update_leaves_profile_unchanged() {
        let store = MemoryStore::with_hats(
            [HardHat::new(HatId::DEFAULT, Some("Blue".into()), Some("Ana".into()))],
            2,
            Duration::from_millis(50),
        );
        let service = TelemetryService::new(EventStore::from(store), HatId::DEFAULT);
        let _ = service.record_event(reading(json!(1), json!("dark"))).await;

        assert!(service.update_hat(&HatProfileUpdate::default()).await.is_ok());

        let Ok(rows) = service.list_events().await else {
            panic!("listing failed");
        };
        let [row] = rows.as_slice() else {
            panic!("expected one row");
        };
        assert_eq!(row.nickname.as_deref(), Some("Blue"));
        assert_eq!(row.owner_name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn store_available_reports_reachable_store() {
        assert!(make_service().store_available().await);
    }

    #[tokio::test]
    async fn store_available_gives_up_before_the_acquire_timeout() {
        let store = MemoryStore::with_hats(
            [HardHat::new(HatId::DEFAULT, None, None)],
            1,
            Duration::from_secs(30),
        );
        let service = TelemetryService::new(EventStore::from(store.clone()), HatId::DEFAULT);
        let Ok(_held) = store.checkout().await else {
            panic!("first connection should be free");
        };

        let started = Instant::now();
        assert!(!service.store_available().await);
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
