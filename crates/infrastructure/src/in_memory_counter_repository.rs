use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use viewbadge_application::CounterRepository;
use viewbadge_core::AppResult;
use viewbadge_domain::{CounterRecord, ResourceKey};

/// In-memory counter store for tests and single-process deployments.
///
/// State is lost when the process exits.
#[derive(Default)]
pub struct InMemoryCounterRepository {
    records: RwLock<HashMap<ResourceKey, CounterRecord>>,
}

impl InMemoryCounterRepository {
    /// Creates an empty in-memory counter store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored counters.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true when no counter has been created yet.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl CounterRepository for InMemoryCounterRepository {
    async fn find_by_key(&self, key: &ResourceKey) -> AppResult<Option<CounterRecord>> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn create_default(&self, key: &ResourceKey) -> AppResult<CounterRecord> {
        let mut records = self.records.write().await;
        let record = records
            .entry(key.clone())
            .or_insert_with(|| CounterRecord::new(key.clone()));

        Ok(record.clone())
    }

    async fn save(&self, record: &CounterRecord) -> AppResult<()> {
        self.records
            .write()
            .await
            .insert(record.key().clone(), record.clone());

        Ok(())
    }
}
