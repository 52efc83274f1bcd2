//! In-process implementation of the event store.
//!
//! Mirrors the PostgreSQL contract closely enough to stand in for it in
//! tests and local runs: the hat foreign key is enforced, `created_at` is
//! assigned by the store, and access goes through a fixed number of
//! "connections" so pool exhaustion behaves the same way.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{RwLock, Semaphore, SemaphorePermit};

use super::StoreError;
use crate::domain::{
    EventWithOwner, HardHat, HatId, HatProfileUpdate, NewImpactEvent, StoredImpactEvent,
};

/// Default pool bound, matching the PostgreSQL pool default.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default wait for a free connection.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct Tables {
    hats: BTreeMap<HatId, HardHat>,
    events: Vec<StoredImpactEvent>,
    next_id: i64,
    last_created_at: Option<DateTime<Utc>>,
}

impl Tables {
    /// Server clock, nudged forward so that timestamps strictly increase.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created_at {
            Some(last) if now <= last => last + TimeDelta::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(ts);
        ts
    }
}

/// Event store held in process memory.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    connections: Arc<Semaphore>,
    acquire_timeout: Duration,
}

impl MemoryStore {
    /// Creates an empty store with no hats.
    #[must_use]
    pub fn new(max_connections: u32, acquire_timeout: Duration) -> Self {
        Self::with_hats(std::iter::empty(), max_connections, acquire_timeout)
    }

    /// Creates a store pre-populated with the given hats.
    #[must_use]
    pub fn with_hats(
        hats: impl IntoIterator<Item = HardHat>,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Self {
        let tables = Tables {
            hats: hats.into_iter().map(|hat| (hat.id, hat)).collect(),
            next_id: 1,
            ..Tables::default()
        };
        let permits = usize::try_from(max_connections.max(1)).unwrap_or(1);
        Self {
            tables: Arc::new(RwLock::new(tables)),
            connections: Arc::new(Semaphore::new(permits)),
            acquire_timeout,
        }
    }

    /// Waits for a free connection slot.
    pub(crate) async fn checkout(&self) -> Result<SemaphorePermit<'_>, StoreError> {
        match tokio::time::timeout(self.acquire_timeout, self.connections.acquire()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) | Err(_) => Err(StoreError::PoolTimedOut),
        }
    }

    /// Appends an event.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ForeignKey`] if the hat is unknown, or
    /// [`StoreError::PoolTimedOut`] when no connection is free.
    pub async fn insert_event(&self, event: &NewImpactEvent) -> Result<i64, StoreError> {
        let _conn = self.checkout().await?;
        let mut tables = self.tables.write().await;

        if !tables.hats.contains_key(&event.hat_id) {
            return Err(StoreError::ForeignKey(event.hat_id));
        }

        let id = tables.next_id;
        tables.next_id = id.saturating_add(1);
        let created_at = tables.next_timestamp();
        tables.events.push(StoredImpactEvent {
            id,
            hat_id: event.hat_id,
            impact: event.impact.code(),
            light_state: event.light_state.as_str().to_string(),
            g_force: event.g_force,
            light_raw: event.light_raw,
            created_at,
        });

        Ok(id)
    }

    /// Returns the most recent event of a hat.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PoolTimedOut`] when no connection is free.
    pub async fn latest_event(
        &self,
        hat_id: HatId,
    ) -> Result<Option<StoredImpactEvent>, StoreError> {
        let _conn = self.checkout().await?;
        let tables = self.tables.read().await;

        Ok(tables
            .events
            .iter()
            .filter(|e| e.hat_id == hat_id)
            .max_by_key(|e| (e.created_at, e.id))
            .cloned())
    }

    /// Removes the events of one hat, or all events.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PoolTimedOut`] when no connection is free.
    pub async fn clear_events(&self, hat_id: Option<HatId>) -> Result<u64, StoreError> {
        let _conn = self.checkout().await?;
        let mut tables = self.tables.write().await;

        let before = tables.events.len();
        match hat_id {
            Some(hat_id) => tables.events.retain(|e| e.hat_id != hat_id),
            None => tables.events.clear(),
        }
        let removed = before.saturating_sub(tables.events.len());

        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }

    /// Updates the display fields of a hat.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PoolTimedOut`] when no connection is free.
    pub async fn update_hat(
        &self,
        hat_id: HatId,
        update: &HatProfileUpdate,
    ) -> Result<u64, StoreError> {
        let _conn = self.checkout().await?;
        let mut tables = self.tables.write().await;

        match tables.hats.get_mut(&hat_id) {
            Some(hat) => {
                hat.apply(update);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    /// Joins events with their hat, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PoolTimedOut`] when no connection is free.
    pub async fn list_events_with_owner(
        &self,
        hat_id: Option<HatId>,
    ) -> Result<Vec<EventWithOwner>, StoreError> {
        let _conn = self.checkout().await?;
        let tables = self.tables.read().await;

        let mut events: Vec<&StoredImpactEvent> = tables
            .events
            .iter()
            .filter(|e| hat_id.is_none_or(|h| e.hat_id == h))
            .collect();
        events.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        Ok(events
            .into_iter()
            .filter_map(|e| {
                tables.hats.get(&e.hat_id).map(|hat| EventWithOwner {
                    nickname: hat.nickname.clone(),
                    owner_name: hat.owner_name.clone(),
                    impact: e.impact,
                    light_state: e.light_state.clone(),
                    g_force: e.g_force,
                    created_at: e.created_at,
                })
            })
            .collect())
    }

    /// Confirms a connection slot can be obtained.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PoolTimedOut`] when no connection is free.
    pub async fn ping(&self) -> Result<(), StoreError> {
        let _conn = self.checkout().await?;
        Ok(())
    }
}

impl Default for MemoryStore {
    /// A store holding the default hat, as after the initial migration.
    fn default() -> Self {
        Self::with_hats(
            [HardHat::new(
                HatId::DEFAULT,
                Some("Hard Hat".to_string()),
                None,
            )],
            DEFAULT_MAX_CONNECTIONS,
            DEFAULT_ACQUIRE_TIMEOUT,
        )
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ImpactSeverity, LightState};

    fn reading(hat_id: HatId, impact: ImpactSeverity) -> NewImpactEvent {
        NewImpactEvent {
            hat_id,
            impact,
            light_state: LightState::Normal,
            g_force: Some(1.2),
            light_raw: None,
        }
    }

    fn two_hat_store() -> MemoryStore {
        MemoryStore::with_hats(
            [
                HardHat::new(HatId::new(1), Some("Blue".into()), Some("Ana".into())),
                HardHat::new(HatId::new(2), Some("Red".into()), Some("Ben".into())),
            ],
            4,
            Duration::from_millis(100),
        )
    }

    #[tokio::test]
    async fn insert_assigns_increasing_ids_and_timestamps() {
        let store = MemoryStore::default();
        let Ok(first) = store.insert_event(&reading(HatId::DEFAULT, ImpactSeverity::Light)).await
        else {
            panic!("insert failed");
        };
        let Ok(second) = store.insert_event(&reading(HatId::DEFAULT, ImpactSeverity::Hard)).await
        else {
            panic!("insert failed");
        };
        assert!(second > first);

        let tables = store.tables.read().await;
        let [a, b] = tables.events.as_slice() else {
            panic!("expected two events");
        };
        assert!(b.created_at > a.created_at);
    }

    #[tokio::test]
    async fn insert_for_unknown_hat_is_rejected() {
        let store = MemoryStore::default();
        let result = store
            .insert_event(&reading(HatId::new(99), ImpactSeverity::Severe))
            .await;
        assert!(matches!(result, Err(StoreError::ForeignKey(id)) if id == HatId::new(99)));
        let Ok(latest) = store.latest_event(HatId::new(99)).await else {
            panic!("read failed");
        };
        assert!(latest.is_none());
    }

    #[tokio::test]
    async fn latest_returns_most_recent_for_that_hat_only() {
        let store = two_hat_store();
        for impact in [ImpactSeverity::Light, ImpactSeverity::Severe] {
            let _ = store.insert_event(&reading(HatId::new(1), impact)).await;
        }
        let _ = store
            .insert_event(&reading(HatId::new(2), ImpactSeverity::Hard))
            .await;

        let Ok(Some(latest)) = store.latest_event(HatId::new(1)).await else {
            panic!("expected an event");
        };
        assert_eq!(latest.impact, 3);
        assert_eq!(latest.hat_id, HatId::new(1));
    }

    #[tokio::test]
    async fn clear_scoped_to_hat_leaves_other_hats() {
        let store = two_hat_store();
        let _ = store.insert_event(&reading(HatId::new(1), ImpactSeverity::Light)).await;
        let _ = store.insert_event(&reading(HatId::new(1), ImpactSeverity::Light)).await;
        let _ = store.insert_event(&reading(HatId::new(2), ImpactSeverity::Light)).await;

        assert_eq!(store.clear_events(Some(HatId::new(1))).await.ok(), Some(2));
        assert_eq!(store.clear_events(Some(HatId::new(1))).await.ok(), Some(0));

        let Ok(Some(_)) = store.latest_event(HatId::new(2)).await else {
            panic!("hat 2 events should survive");
        };
        assert_eq!(store.clear_events(None).await.ok(), Some(1));
    }

    #[tokio::test]
    async fn update_of_missing_hat_affects_no_rows() {
        let store = MemoryStore::new(2, Duration::from_millis(100));
        let update = HatProfileUpdate {
            nickname: Some("Ghost".into()),
            owner_name: None,
        };
        assert_eq!(store.update_hat(HatId::DEFAULT, &update).await.ok(), Some(0));
    }

    #[tokio::test]
    async fn listing_joins_owner_and_orders_newest_first() {
        let store = two_hat_store();
        let _ = store.insert_event(&reading(HatId::new(1), ImpactSeverity::Light)).await;
        let _ = store.insert_event(&reading(HatId::new(2), ImpactSeverity::Hard)).await;
        let _ = store.insert_event(&reading(HatId::new(1), ImpactSeverity::Severe)).await;

        let Ok(rows) = store.list_events_with_owner(None).await else {
            panic!("listing failed");
        };
        let impacts: Vec<i32> = rows.iter().map(|r| r.impact).collect();
        assert_eq!(impacts, vec![3, 2, 1]);
        assert!(rows.windows(2).all(|w| match w {
            [a, b] => a.created_at > b.created_at,
            _ => false,
        }));
        let owners: Vec<Option<&str>> = rows.iter().map(|r| r.owner_name.as_deref()).collect();
        assert_eq!(owners, vec![Some("Ana"), Some("Ben"), Some("Ana")]);

        let Ok(only_red) = store.list_events_with_owner(Some(HatId::new(2))).await else {
            panic!("listing failed");
        };
        assert_eq!(only_red.len(), 1);
        assert!(only_red.iter().all(|r| r.nickname.as_deref() == Some("Red")));
    }

    #[tokio::test]
    async fn exhausted_pool_times_out() {
        let store = MemoryStore::with_hats(
            [HardHat::new(HatId::DEFAULT, None, None)],
            1,
            Duration::from_millis(20),
        );
        let Ok(held) = store.checkout().await else {
            panic!("first checkout should succeed");
        };

        let result = store
            .insert_event(&reading(HatId::DEFAULT, ImpactSeverity::Light))
            .await;
        assert!(matches!(result, Err(StoreError::PoolTimedOut)));

        drop(held);
        assert!(store.ping().await.is_ok());
        let Ok(None) = store.latest_event(HatId::DEFAULT).await else {
            panic!("timed-out insert must not persist");
        };
    }

    #[tokio::test]
    async fn waiting_caller_proceeds_once_a_connection_frees_up() {
        let store = MemoryStore::with_hats(
            [HardHat::new(HatId::DEFAULT, None, None)],
            1,
            Duration::from_secs(2),
        );
        let Ok(held) = Arc::clone(&store.connections).acquire_owned().await else {
            panic!("acquire failed");
        };
        let waiter = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .insert_event(&reading(HatId::DEFAULT, ImpactSeverity::Hard))
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        drop(held);

        let Ok(Ok(id)) = waiter.await else {
            panic!("waiting insert should succeed");
        };
        assert_eq!(id, 1);
    }
}
