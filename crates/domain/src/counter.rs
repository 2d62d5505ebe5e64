//! Counter records and the view attribution rules applied to them.
//!
//! A counter only ever grows. Each accepted visit leaves an attribution entry
//! behind so the same client is not counted twice inside the dedupe window,
//! and entries that fall out of the window are pruned on every write.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use viewbadge_core::{AppError, AppResult};

/// Maximum accepted length of a resource key.
pub const RESOURCE_KEY_MAX_LENGTH: usize = 200;

/// Validated identifier of the resource being counted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Creates a validated resource key.
    ///
    /// Keys are trimmed and must be non-empty, at most
    /// [`RESOURCE_KEY_MAX_LENGTH`] characters, and contain only ASCII
    /// alphanumerics, `-`, `_` or `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "resource key must not be empty".to_owned(),
            ));
        }

        if trimmed.len() > RESOURCE_KEY_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "resource key must not exceed {RESOURCE_KEY_MAX_LENGTH} characters"
            )));
        }

        if let Some(invalid) = trimmed
            .chars()
            .find(|character| !is_resource_key_character(*character))
        {
            return Err(AppError::Validation(format!(
                "resource key contains unsupported character '{invalid}'"
            )));
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

fn is_resource_key_character(character: char) -> bool {
    character.is_ascii_alphanumeric() || matches!(character, '-' | '_' | '.')
}

/// Identifier of the client a view is attributed to.
///
/// Taken literally: an empty identifier is a valid bucket shared by every
/// client that could not be told apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(String);

impl ClientId {
    /// Wraps a client identifier without validation.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// A single counted visit kept for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    client_id: ClientId,
    timestamp: DateTime<Utc>,
}

impl Attribution {
    /// Creates an attribution entry.
    #[must_use]
    pub fn new(client_id: ClientId, timestamp: DateTime<Utc>) -> Self {
        Self {
            client_id,
            timestamp,
        }
    }

    /// Returns the attributed client.
    #[must_use]
    pub fn client_id(&self) -> &ClientId {
        &self.client_id
    }

    /// Returns when the visit was counted.
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn is_within(&self, window_start: DateTime<Utc>) -> bool {
        self.timestamp > window_start
    }
}

/// Trailing window used to dedupe and prune attributions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupeWindow(Duration);

impl DedupeWindow {
    /// Creates a window from a length in seconds.
    pub fn from_seconds(seconds: i64) -> AppResult<Self> {
        if seconds <= 0 {
            return Err(AppError::Validation(
                "dedupe window must be greater than zero seconds".to_owned(),
            ));
        }

        Duration::try_seconds(seconds).map(Self).ok_or_else(|| {
            AppError::Validation(format!("dedupe window of {seconds} seconds is out of range"))
        })
    }

    /// Returns the window length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.0
    }

    /// Returns the exclusive lower bound of the window ending at `now`.
    #[must_use]
    pub fn start_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_sub_signed(self.0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl Default for DedupeWindow {
    fn default() -> Self {
        Self(Duration::hours(1))
    }
}

/// Result of attributing a visit to a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// The visit was counted.
    New,
    /// The client was already counted inside the window.
    Repeat,
}

impl VisitOutcome {
    /// Returns true when the visit incremented the counter.
    #[must_use]
    pub fn is_counted(self) -> bool {
        matches!(self, Self::New)
    }
}

/// View counter for one resource key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRecord {
    key: ResourceKey,
    count: u64,
    attributions: Vec<Attribution>,
}

impl CounterRecord {
    /// Creates a zeroed counter with no attributions.
    #[must_use]
    pub fn new(key: ResourceKey) -> Self {
        Self {
            key,
            count: 0,
            attributions: Vec::new(),
        }
    }

    /// Rebuilds a counter from persisted state.
    #[must_use]
    pub fn from_parts(key: ResourceKey, count: u64, attributions: Vec<Attribution>) -> Self {
        Self {
            key,
            count,
            attributions,
        }
    }

    /// Returns the counted resource key.
    #[must_use]
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Returns the number of counted visits.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Returns the attribution entries currently kept.
    #[must_use]
    pub fn attributions(&self) -> &[Attribution] {
        self.attributions.as_slice()
    }

    /// Returns true when `client_id` was counted after `window_start`.
    #[must_use]
    pub fn has_recent_attribution(
        &self,
        client_id: &ClientId,
        window_start: DateTime<Utc>,
    ) -> bool {
        self.attributions
            .iter()
            .any(|entry| entry.client_id == *client_id && entry.is_within(window_start))
    }

    /// Attributes a visit at `now` and prunes entries outside the window.
    ///
    /// A client already counted inside the window leaves the count untouched.
    /// Pruning runs for both outcomes.
    pub fn record_visit(
        &mut self,
        client_id: ClientId,
        now: DateTime<Utc>,
        window: DedupeWindow,
    ) -> VisitOutcome {
        let window_start = window.start_at(now);

        let outcome = if self.has_recent_attribution(&client_id, window_start) {
            VisitOutcome::Repeat
        } else {
            self.count = self.count.saturating_add(1);
            self.attributions.push(Attribution::new(client_id, now));
            VisitOutcome::New
        };

        self.prune_before(window_start);
        outcome
    }

    /// Drops attributions not newer than `window_start`, returning how many were removed.
    pub fn prune_before(&mut self, window_start: DateTime<Utc>) -> usize {
        let before = self.attributions.len();
        self.attributions.retain(|entry| entry.is_within(window_start));
        before - self.attributions.len()
    }
}
