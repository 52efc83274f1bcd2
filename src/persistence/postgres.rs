//! PostgreSQL implementation of the event store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use super::StoreError;
use crate::domain::{EventWithOwner, HatId, HatProfileUpdate, NewImpactEvent, StoredImpactEvent};

/// SQLSTATE for `foreign_key_violation`.
const FOREIGN_KEY_VIOLATION: &str = "23503";

type EventRow = (
    i64,
    i64,
    i32,
    String,
    Option<f64>,
    Option<f64>,
    DateTime<Utc>,
);

type JoinedRow = (
    Option<String>,
    Option<String>,
    i32,
    String,
    Option<f64>,
    DateTime<Utc>,
);

/// PostgreSQL-backed event store using a bounded `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Builds a lazily connecting pool capped at `max_connections`
    /// (at least one).
    ///
    /// No connection is opened until the first query. Callers that find
    /// every connection busy wait up to `acquire_timeout` and then fail
    /// with [`StoreError::PoolTimedOut`].
    #[must_use]
    pub fn connect_lazy(
        options: PgConnectOptions,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Self {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(acquire_timeout)
            .connect_lazy_with(options);
        Self { pool }
    }

    /// Applies the embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::Migration`] if a migration fails.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Appends an event to `impact_events`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError::ForeignKey`] if the hat row is missing, or
    /// another [`StoreError`] on database failure.
    pub async fn insert_event(&self, event: &NewImpactEvent) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO impact_events (hat_id, impact, light_state, g_force, light_raw) \
             VALUES ($1, $2, $3, $4, $5) RETURNING id",
        )
        .bind(event.hat_id.get())
        .bind(event.impact.code())
        .bind(event.light_state.as_str())
        .bind(event.g_force)
        .bind(event.light_raw)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::ForeignKey(event.hat_id)
            } else {
                StoreError::from_sqlx(e)
            }
        })?;

        Ok(id)
    }

    /// Loads the most recent event of a hat.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on database failure.
    pub async fn latest_event(
        &self,
        hat_id: HatId,
    ) -> Result<Option<StoredImpactEvent>, StoreError> {
        let row = sqlx::query_as::<_, EventRow>(
            "SELECT id, hat_id, impact, light_state, g_force, light_raw, created_at \
             FROM impact_events WHERE hat_id = $1 \
             ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(hat_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(row.map(
            |(id, hat_id, impact, light_state, g_force, light_raw, created_at)| {
                StoredImpactEvent {
                    id,
                    hat_id: HatId::new(hat_id),
                    impact,
                    light_state,
                    g_force,
                    light_raw,
                    created_at,
                }
            },
        ))
    }

    /// Deletes the events of one hat, or every event when `hat_id` is `None`.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on database failure.
    pub async fn clear_events(&self, hat_id: Option<HatId>) -> Result<u64, StoreError> {
        let result = if let Some(hat_id) = hat_id {
            sqlx::query("DELETE FROM impact_events WHERE hat_id = $1")
                .bind(hat_id.get())
                .execute(&self.pool)
                .await
        } else {
            sqlx::query("DELETE FROM impact_events")
                .execute(&self.pool)
                .await
        }
        .map_err(StoreError::from_sqlx)?;

        Ok(result.rows_affected())
    }

    /// Updates the display fields of a hat, keeping fields not provided.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on database failure.
    pub async fn update_hat(
        &self,
        hat_id: HatId,
        update: &HatProfileUpdate,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE hard_hats \
             SET nickname = COALESCE($2, nickname), owner_name = COALESCE($3, owner_name) \
             WHERE id = $1",
        )
        .bind(hat_id.get())
        .bind(update.nickname.as_deref())
        .bind(update.owner_name.as_deref())
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(result.rows_affected())
    }

    /// Inner-joins hats and events, newest event first.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] on database failure.
    pub async fn list_events_with_owner(
        &self,
        hat_id: Option<HatId>,
    ) -> Result<Vec<EventWithOwner>, StoreError> {
        let rows = sqlx::query_as::<_, JoinedRow>(
            "SELECT h.nickname, h.owner_name, e.impact, e.light_state, e.g_force, e.created_at \
             FROM impact_events e \
             INNER JOIN hard_hats h ON h.id = e.hat_id \
             WHERE ($1::BIGINT IS NULL OR e.hat_id = $1) \
             ORDER BY e.created_at DESC, e.id DESC",
        )
        .bind(hat_id.map(HatId::get))
        .fetch_all(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(rows
            .into_iter()
            .map(
                |(nickname, owner_name, impact, light_state, g_force, created_at)| EventWithOwner {
                    nickname,
                    owner_name,
                    impact,
                    light_state,
                    g_force,
                    created_at,
                },
            )
            .collect())
    }

    /// Runs a trivial query to confirm the database answers.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if no connection can be used.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == FOREIGN_KEY_VIOLATION)
}
