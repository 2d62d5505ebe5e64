use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use viewbadge_core::{AppError, AppResult};
use viewbadge_domain::{ClientId, CounterRecord, DedupeWindow, ResourceKey, VisitOutcome};

use super::{CounterRepository, ViewCounterService};

#[derive(Default)]
struct TestCounterRepo {
    records: Mutex<HashMap<String, CounterRecord>>,
    creates: Mutex<usize>,
    saves: Mutex<usize>,
}

impl TestCounterRepo {
    fn stored(&self, key: &str) -> Option<CounterRecord> {
        self.records
            .lock()
            .ok()
            .and_then(|records| records.get(key).cloned())
    }

    fn create_calls(&self) -> usize {
        self.creates.lock().map(|guard| *guard).unwrap_or(0)
    }

    fn save_calls(&self) -> usize {
        self.saves.lock().map(|guard| *guard).unwrap_or(0)
    }
}

fn lock_error(error: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("failed to lock repo state: {error}"))
}

#[async_trait]
impl CounterRepository for TestCounterRepo {
    async fn find_by_key(&self, key: &ResourceKey) -> AppResult<Option<CounterRecord>> {
        Ok(self
            .records
            .lock()
            .map_err(lock_error)?
            .get(key.as_str())
            .cloned())
    }

    async fn create_default(&self, key: &ResourceKey) -> AppResult<CounterRecord> {
        *self.creates.lock().map_err(lock_error)? += 1;
        Ok(self
            .records
            .lock()
            .map_err(lock_error)?
            .entry(key.as_str().to_owned())
            .or_insert_with(|| CounterRecord::new(key.clone()))
            .clone())
    }

    async fn save(&self, record: &CounterRecord) -> AppResult<()> {
        *self.saves.lock().map_err(lock_error)? += 1;
        self.records
            .lock()
            .map_err(lock_error)?
            .insert(record.key().as_str().to_owned(), record.clone());
        Ok(())
    }
}

struct UnavailableCounterRepo {
    fail_on_save_only: bool,
    inner: TestCounterRepo,
}

#[async_trait]
impl CounterRepository for UnavailableCounterRepo {
    async fn find_by_key(&self, key: &ResourceKey) -> AppResult<Option<CounterRecord>> {
        if self.fail_on_save_only {
            return self.inner.find_by_key(key).await;
        }
        Err(AppError::Internal("counter store unavailable".to_owned()))
    }

    async fn create_default(&self, key: &ResourceKey) -> AppResult<CounterRecord> {
        self.inner.create_default(key).await
    }

    async fn save(&self, _record: &CounterRecord) -> AppResult<()> {
        Err(AppError::Internal("counter store unavailable".to_owned()))
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn key(value: &str) -> ResourceKey {
    ResourceKey::new(value).unwrap_or_else(|error| panic!("invalid test key: {error}"))
}

fn service(repo: Arc<TestCounterRepo>) -> ViewCounterService {
    ViewCounterService::new(repo, DedupeWindow::default())
}

async fn count_at(
    service: &ViewCounterService,
    resource: &str,
    client: &str,
    now: DateTime<Utc>,
) -> Option<u64> {
    service
        .record_view(&key(resource), ClientId::new(client), now)
        .await
        .ok()
        .map(|recorded| recorded.count)
}

#[tokio::test]
async fn first_view_creates_counter_and_reports_one() {
    let repo = Arc::new(TestCounterRepo::default());
    let service = service(repo.clone());

    let recorded = service
        .record_view(&key("repo1"), ClientId::new("1.2.3.4"), t0())
        .await;

    assert!(recorded.is_ok());
    let recorded = recorded.unwrap_or_else(|error| panic!("{error}"));
    assert_eq!(recorded.count, 1);
    assert_eq!(recorded.outcome, VisitOutcome::New);
    assert!(recorded.created);
    assert_eq!(repo.create_calls(), 1);
    assert_eq!(repo.save_calls(), 1);
}

#[tokio::test]
async fn badge_scenario_counts_dedupes_and_expires() {
    let repo = Arc::new(TestCounterRepo::default());
    let service = service(repo.clone());

    assert_eq!(count_at(&service, "repo1", "1.2.3.4", t0()).await, Some(1));
    assert_eq!(
        count_at(&service, "repo1", "1.2.3.4", t0() + Duration::minutes(10)).await,
        Some(1)
    );
    assert_eq!(
        count_at(&service, "repo1", "5.6.7.8", t0() + Duration::minutes(20)).await,
        Some(2)
    );
    assert_eq!(
        count_at(&service, "repo1", "1.2.3.4", t0() + Duration::hours(2)).await,
        Some(3)
    );

    let stored = repo.stored("repo1");
    let timestamps: Vec<_> = stored
        .iter()
        .flat_map(|record| record.attributions().iter().map(|entry| entry.timestamp()))
        .collect();
    assert_eq!(timestamps, vec![t0() + Duration::hours(2)]);
    assert_eq!(repo.create_calls(), 1);
}

#[tokio::test]
async fn repeat_view_does_not_change_stored_count() {
    let repo = Arc::new(TestCounterRepo::default());
    let service = service(repo.clone());

    let _ = count_at(&service, "repo1", "1.2.3.4", t0()).await;
    let repeat = service
        .record_view(
            &key("repo1"),
            ClientId::new("1.2.3.4"),
            t0() + Duration::minutes(59),
        )
        .await
        .ok();

    assert_eq!(repeat.map(|recorded| recorded.outcome), Some(VisitOutcome::Repeat));
    assert_eq!(repo.stored("repo1").map(|record| record.count()), Some(1));
    assert_eq!(
        repo.stored("repo1").map(|record| record.attributions().len()),
        Some(1)
    );
}

#[tokio::test]
async fn view_after_window_is_counted_again() {
    let repo = Arc::new(TestCounterRepo::default());
    let service = service(repo);

    let _ = count_at(&service, "repo1", "1.2.3.4", t0()).await;
    let later = t0() + Duration::hours(1) + Duration::seconds(1);

    assert_eq!(count_at(&service, "repo1", "1.2.3.4", later).await, Some(2));
}

#[tokio::test]
async fn counters_for_different_keys_are_isolated() {
    let repo = Arc::new(TestCounterRepo::default());
    let service = service(repo.clone());

    let _ = count_at(&service, "repo-a", "1.2.3.4", t0()).await;
    let _ = count_at(&service, "repo-a", "5.6.7.8", t0()).await;
    let repo_b = count_at(&service, "repo-b", "1.2.3.4", t0()).await;

    assert_eq!(repo_b, Some(1));
    assert_eq!(repo.stored("repo-a").map(|record| record.count()), Some(2));
    assert_eq!(repo.stored("repo-b").map(|record| record.count()), Some(1));
}

#[tokio::test]
async fn configured_window_controls_dedupe() {
    let repo = Arc::new(TestCounterRepo::default());
    let window = DedupeWindow::from_seconds(60).unwrap_or_default();
    let service = ViewCounterService::new(repo, window);

    let _ = count_at(&service, "repo1", "1.2.3.4", t0()).await;

    assert_eq!(
        count_at(&service, "repo1", "1.2.3.4", t0() + Duration::seconds(30)).await,
        Some(1)
    );
    assert_eq!(
        count_at(&service, "repo1", "1.2.3.4", t0() + Duration::seconds(61)).await,
        Some(2)
    );
}

#[tokio::test]
async fn lookup_failure_is_returned_without_writes() {
    let repo = Arc::new(UnavailableCounterRepo {
        fail_on_save_only: false,
        inner: TestCounterRepo::default(),
    });
    let service = ViewCounterService::new(repo.clone(), DedupeWindow::default());

    let result = service
        .record_view(&key("repo1"), ClientId::new("1.2.3.4"), t0())
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
    assert_eq!(repo.inner.create_calls(), 0);
}

#[tokio::test]
async fn save_failure_leaves_stored_record_unchanged() {
    let repo = Arc::new(UnavailableCounterRepo {
        fail_on_save_only: true,
        inner: TestCounterRepo::default(),
    });
    let service = ViewCounterService::new(repo.clone(), DedupeWindow::default());

    let result = service
        .record_view(&key("repo1"), ClientId::new("1.2.3.4"), t0())
        .await;

    assert!(result.is_err());
    assert_eq!(repo.inner.stored("repo1").map(|record| record.count()), Some(0));
}

struct VanishingCounterRepo;

#[async_trait]
impl CounterRepository for VanishingCounterRepo {
    async fn find_by_key(&self, key: &ResourceKey) -> AppResult<Option<CounterRecord>> {
        Ok(Some(CounterRecord::new(key.clone())))
    }

    async fn create_default(&self, key: &ResourceKey) -> AppResult<CounterRecord> {
        Ok(CounterRecord::new(key.clone()))
    }

    async fn save(&self, record: &CounterRecord) -> AppResult<()> {
        Err(AppError::NotFound(format!(
            "view counter '{}' does not exist",
            record.key()
        )))
    }
}

#[tokio::test]
async fn missing_counter_on_save_is_an_internal_failure() {
    let service = ViewCounterService::new(Arc::new(VanishingCounterRepo), DedupeWindow::default());

    let result = service
        .record_view(&key("repo1"), ClientId::new("1.2.3.4"), t0())
        .await;

    assert!(matches!(result, Err(AppError::Internal(_))));
}
