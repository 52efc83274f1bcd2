//! Persistence layer: the impact event store.
//!
//! [`EventStore`] is the single gateway the service talks to. It dispatches
//! to one of two backends with the same contract:
//!
//! - [`PostgresStore`]: `sqlx::PgPool` against the `hard_hats` and
//!   `impact_events` tables.
//! - [`MemoryStore`]: in-process tables for local runs and tests.
//!
//! Both backends are bounded: a request that cannot get a connection
//! within the acquire timeout fails with [`StoreError::PoolTimedOut`].

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::domain::{EventWithOwner, HatId, HatProfileUpdate, NewImpactEvent, StoredImpactEvent};

/// Errors raised by an event store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Query or connection failure reported by the database driver.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Embedded schema migrations failed to apply.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Every connection is in use and none was released before the
    /// acquire timeout elapsed.
    #[error("connection pool exhausted")]
    PoolTimedOut,

    /// Event references a hat that does not exist.
    #[error("hat {0} does not exist")]
    ForeignKey(HatId),
}

impl StoreError {
    /// Normalizes driver errors so that pool exhaustion is reported the
    /// same way by every backend.
    fn from_sqlx(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => Self::PoolTimedOut,
            other => Self::Database(other),
        }
    }
}

/// The impact event store used by the service layer.
#[derive(Debug, Clone)]
pub enum EventStore {
    /// PostgreSQL backend.
    Postgres(PostgresStore),
    /// In-process backend.
    Memory(MemoryStore),
}

impl EventStore {
    /// Short backend name for logs and health output.
    #[must_use]
    pub const fn backend_name(&self) -> &'static str {
        match self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }

    /// Appends one event and returns its row ID.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store is unreachable, the pool is
    /// exhausted, or the hat does not exist.
    pub async fn insert_event(&self, event: &NewImpactEvent) -> Result<i64, StoreError> {
        match self {
            Self::Postgres(store) => store.insert_event(event).await,
            Self::Memory(store) => store.insert_event(event).await,
        }
    }

    /// Returns the event with the greatest `created_at` for the hat.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on backend failure.
    pub async fn latest_event(
        &self,
        hat_id: HatId,
    ) -> Result<Option<StoredImpactEvent>, StoreError> {
        match self {
            Self::Postgres(store) => store.latest_event(hat_id).await,
            Self::Memory(store) => store.latest_event(hat_id).await,
        }
    }

    /// Deletes every event of `hat_id`, or the whole table when `None`.
    /// Returns the number of rows removed.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on backend failure.
    pub async fn clear_events(&self, hat_id: Option<HatId>) -> Result<u64, StoreError> {
        match self {
            Self::Postgres(store) => store.clear_events(hat_id).await,
            Self::Memory(store) => store.clear_events(hat_id).await,
        }
    }

    /// Overwrites the provided display fields of a hat. Returns the number
    /// of rows affected, which is `0` when the hat does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on backend failure.
    pub async fn update_hat(
        &self,
        hat_id: HatId,
        update: &HatProfileUpdate,
    ) -> Result<u64, StoreError> {
        match self {
            Self::Postgres(store) => store.update_hat(hat_id, update).await,
            Self::Memory(store) => store.update_hat(hat_id, update).await,
        }
    }

    /// Joins events with their hat, newest first, optionally restricted
    /// to one hat.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on backend failure.
    pub async fn list_events_with_owner(
        &self,
        hat_id: Option<HatId>,
    ) -> Result<Vec<EventWithOwner>, StoreError> {
        match self {
            Self::Postgres(store) => store.list_events_with_owner(hat_id).await,
            Self::Memory(store) => store.list_events_with_owner(hat_id).await,
        }
    }

    /// Checks that the store can serve a query.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store is unreachable.
    pub async fn ping(&self) -> Result<(), StoreError> {
        match self {
            Self::Postgres(store) => store.ping().await,
            Self::Memory(store) => store.ping().await,
        }
    }
}

impl From<PostgresStore> for EventStore {
    fn from(store: PostgresStore) -> Self {
        Self::Postgres(store)
    }
}

impl From<MemoryStore> for EventStore {
    fn from(store: MemoryStore) -> Self {
        Self::Memory(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqlx_pool_timeout_maps_to_pool_timed_out() {
        let err = StoreError::from_sqlx(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::PoolTimedOut));
    }

    #[test]
    fn other_sqlx_errors_stay_database_errors() {
        let err = StoreError::from_sqlx(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn backend_name_reflects_variant() {
        let store = EventStore::from(MemoryStore::default());
        assert_eq!(store.backend_name(), "memory");
    }
}
