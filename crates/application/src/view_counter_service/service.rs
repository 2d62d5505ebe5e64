use std::sync::Arc;

use chrono::{DateTime, Utc};

use viewbadge_core::{AppError, AppResult};
use viewbadge_domain::{ClientId, DedupeWindow, ResourceKey, VisitOutcome};

use super::ports::CounterRepository;

/// Outcome of recording one badge view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordedView {
    /// Count to report after this view.
    pub count: u64,
    /// Whether the view was counted or deduplicated.
    pub outcome: VisitOutcome,
    /// Whether this request created the counter record.
    pub created: bool,
}

/// Application service for view counting.
#[derive(Clone)]
pub struct ViewCounterService {
    repository: Arc<dyn CounterRepository>,
    window: DedupeWindow,
}

impl ViewCounterService {
    /// Creates a new view counter service.
    #[must_use]
    pub fn new(repository: Arc<dyn CounterRepository>, window: DedupeWindow) -> Self {
        Self { repository, window }
    }

    /// Records a view of `key` by `client_id` at `now`.
    ///
    /// Creates the counter on first sight, counts the view unless the client
    /// was already counted inside the window, prunes stale attributions and
    /// saves the record. Every store failure is reported as an internal error;
    /// nothing is written when the lookup or creation fails.
    pub async fn record_view(
        &self,
        key: &ResourceKey,
        client_id: ClientId,
        now: DateTime<Utc>,
    ) -> AppResult<RecordedView> {
        let existing = self
            .repository
            .find_by_key(key)
            .await
            .map_err(store_failure)?;
        let (mut record, created) = match existing {
            Some(record) => (record, false),
            None => (
                self.repository
                    .create_default(key)
                    .await
                    .map_err(store_failure)?,
                true,
            ),
        };

        let outcome = record.record_visit(client_id, now, self.window);
        self.repository.save(&record).await.map_err(store_failure)?;

        Ok(RecordedView {
            count: record.count(),
            outcome,
            created,
        })
    }

    /// Records a view at the current time.
    pub async fn record_view_now(
        &self,
        key: &ResourceKey,
        client_id: ClientId,
    ) -> AppResult<RecordedView> {
        self.record_view(key, client_id, Utc::now()).await
    }
}

fn store_failure(error: AppError) -> AppError {
    match error {
        AppError::Internal(_) => error,
        other => AppError::Internal(format!("counter store failed: {other}")),
    }
}
