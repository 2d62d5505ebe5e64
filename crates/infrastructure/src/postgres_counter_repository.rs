//! PostgreSQL-backed counter store using the `view_counters` and
//! `view_attributions` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use viewbadge_application::CounterRepository;
use viewbadge_core::{AppError, AppResult};
use viewbadge_domain::{Attribution, ClientId, CounterRecord, ResourceKey};

/// PostgreSQL implementation of the counter repository port.
#[derive(Clone)]
pub struct PostgresCounterRepository {
    pool: PgPool,
}

impl PostgresCounterRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CounterRepository for PostgresCounterRepository {
    async fn find_by_key(&self, key: &ResourceKey) -> AppResult<Option<CounterRecord>> {
        let row = sqlx::query_as::<_, CounterRow>(
            r#"
            SELECT
                counters.count,
                COALESCE(
                    array_agg(attributions.client_id ORDER BY attributions.viewed_at, attributions.client_id)
                        FILTER (WHERE attributions.counter_key IS NOT NULL),
                    '{}'
                ) AS client_ids,
                COALESCE(
                    array_agg(attributions.viewed_at ORDER BY attributions.viewed_at, attributions.client_id)
                        FILTER (WHERE attributions.counter_key IS NOT NULL),
                    '{}'
                ) AS viewed_at
            FROM view_counters counters
            LEFT JOIN view_attributions attributions
                ON attributions.counter_key = counters.key
            WHERE counters.key = $1
            GROUP BY counters.key, counters.count
            "#,
        )
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load view counter '{key}': {error}"))
        })?;

        row.map(|row| row.into_record(key)).transpose()
    }

    async fn create_default(&self, key: &ResourceKey) -> AppResult<CounterRecord> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO view_counters (key, count)
            VALUES ($1, 0)
            ON CONFLICT (key) DO NOTHING
            "#,
        )
        .bind(key.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to create view counter '{key}': {error}"))
        })?;

        if inserted.rows_affected() == 1 {
            return Ok(CounterRecord::new(key.clone()));
        }

        debug!(%key, "view counter was created by a concurrent request");
        self.find_by_key(key)
            .await?
            .ok_or_else(|| AppError::Internal(format!("view counter '{key}' disappeared")))
    }

    async fn save(&self, record: &CounterRecord) -> AppResult<()> {
        let key = record.key();
        let count = i64::try_from(record.count()).map_err(|error| {
            AppError::Internal(format!("view counter '{key}' exceeds storage range: {error}"))
        })?;
        let (client_ids, viewed_at): (Vec<String>, Vec<DateTime<Utc>>) = record
            .attributions()
            .iter()
            .map(|entry| (entry.client_id().as_str().to_owned(), entry.timestamp()))
            .unzip();

        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to start save transaction for view counter '{key}': {error}"
            ))
        })?;

        let updated = sqlx::query(
            r#"
            UPDATE view_counters
            SET count = $2, updated_at = now()
            WHERE key = $1
            "#,
        )
        .bind(key.as_str())
        .bind(count)
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update view counter '{key}': {error}"))
        })?;

        if updated.rows_affected() == 0 {
            return Err(AppError::Internal(format!(
                "view counter '{key}' does not exist"
            )));
        }

        sqlx::query(
            r#"
            DELETE FROM view_attributions
            WHERE counter_key = $1
            "#,
        )
        .bind(key.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to clear attributions for view counter '{key}': {error}"
            ))
        })?;

        if !client_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO view_attributions (counter_key, client_id, viewed_at)
                SELECT $1, entries.client_id, entries.viewed_at
                FROM UNNEST($2::text[], $3::timestamptz[]) AS entries(client_id, viewed_at)
                "#,
            )
            .bind(key.as_str())
            .bind(client_ids)
            .bind(viewed_at)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to store attributions for view counter '{key}': {error}"
                ))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!(
                "failed to commit save transaction for view counter '{key}': {error}"
            ))
        })?;

        Ok(())
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CounterRow {
    count: i64,
    client_ids: Vec<String>,
    viewed_at: Vec<DateTime<Utc>>,
}

impl CounterRow {
    fn into_record(self, key: &ResourceKey) -> AppResult<CounterRecord> {
        let count = u64::try_from(self.count).map_err(|error| {
            AppError::Internal(format!("invalid stored count for view counter '{key}': {error}"))
        })?;

        if self.client_ids.len() != self.viewed_at.len() {
            return Err(AppError::Internal(format!(
                "mismatched attribution columns for view counter '{key}'"
            )));
        }

        let attributions = self
            .client_ids
            .into_iter()
            .zip(self.viewed_at)
            .map(|(client_id, viewed_at)| Attribution::new(ClientId::new(client_id), viewed_at))
            .collect();

        Ok(CounterRecord::from_parts(key.clone(), count, attributions))
    }
}
