//! Redis-backed counter store.
//!
//! Each counter is stored as one JSON document under `{prefix}:{key}`.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tracing::debug;
use viewbadge_application::CounterRepository;
use viewbadge_core::{AppError, AppResult};
use viewbadge_domain::{CounterRecord, ResourceKey};

/// Redis implementation of the counter repository port.
#[derive(Clone)]
pub struct RedisCounterRepository {
    client: redis::Client,
    key_prefix: String,
}

impl RedisCounterRepository {
    /// Creates a repository with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, key: &ResourceKey) -> String {
        format!("{}:{key}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

fn encode(record: &CounterRecord) -> AppResult<String> {
    serde_json::to_string(record).map_err(|error| {
        AppError::Internal(format!(
            "failed to serialize view counter '{}': {error}",
            record.key()
        ))
    })
}

fn decode(key: &ResourceKey, payload: &str) -> AppResult<CounterRecord> {
    let record: CounterRecord = serde_json::from_str(payload).map_err(|error| {
        AppError::Internal(format!("failed to decode view counter '{key}': {error}"))
    })?;

    if record.key() != key {
        return Err(AppError::Internal(format!(
            "redis document for view counter '{key}' belongs to '{}'",
            record.key()
        )));
    }

    Ok(record)
}

#[async_trait]
impl CounterRepository for RedisCounterRepository {
    async fn find_by_key(&self, key: &ResourceKey) -> AppResult<Option<CounterRecord>> {
        let mut connection = self.connection().await?;
        let payload: Option<String> = connection.get(self.key_for(key)).await.map_err(|error| {
            AppError::Internal(format!("failed to load redis view counter '{key}': {error}"))
        })?;

        payload.map(|payload| decode(key, &payload)).transpose()
    }

    async fn create_default(&self, key: &ResourceKey) -> AppResult<CounterRecord> {
        let record = CounterRecord::new(key.clone());
        let payload = encode(&record)?;
        let redis_key = self.key_for(key);

        let mut connection = self.connection().await?;
        let created: bool = connection
            .set_nx(&redis_key, payload)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to create redis view counter '{key}': {error}"))
            })?;

        if created {
            return Ok(record);
        }

        debug!(%key, "redis view counter was created by a concurrent request");

        let existing: Option<String> = connection.get(&redis_key).await.map_err(|error| {
            AppError::Internal(format!("failed to load redis view counter '{key}': {error}"))
        })?;

        existing
            .map(|payload| decode(key, &payload))
            .transpose()?
            .ok_or_else(|| AppError::Internal(format!("view counter '{key}' disappeared")))
    }

    async fn save(&self, record: &CounterRecord) -> AppResult<()> {
        let payload = encode(record)?;
        let key = record.key();

        let mut connection = self.connection().await?;
        connection
            .set::<_, _, ()>(self.key_for(key), payload)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to save redis view counter '{key}': {error}"))
            })
    }
}
