use async_trait::async_trait;

use viewbadge_core::AppResult;
use viewbadge_domain::{CounterRecord, ResourceKey};

/// Repository port for counter record persistence.
#[async_trait]
pub trait CounterRepository: Send + Sync {
    /// Returns the counter stored for `key`, if any.
    async fn find_by_key(&self, key: &ResourceKey) -> AppResult<Option<CounterRecord>>;

    /// Persists a zeroed counter for `key` and returns the stored record.
    ///
    /// Uses a create-or-get pattern: when a concurrent request created the
    /// counter first, the existing record is returned unchanged.
    async fn create_default(&self, key: &ResourceKey) -> AppResult<CounterRecord>;

    /// Replaces the stored count and attributions for the record's key.
    async fn save(&self, record: &CounterRecord) -> AppResult<()>;
}
