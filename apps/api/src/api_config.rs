use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use tracing_subscriber::EnvFilter;
use viewbadge_core::AppError;
use viewbadge_domain::DedupeWindow;

const DEFAULT_REDIS_KEY_PREFIX: &str = "viewbadge:counter";

/// Backend holding counter records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterStoreConfig {
    Postgres { database_url: String },
    Redis { redis_url: String, key_prefix: String },
    Memory,
}

impl CounterStoreConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::Redis { .. } => "redis",
            Self::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub counter_store: CounterStoreConfig,
    pub dedupe_window: DedupeWindow,
    pub cors_allowed_origin: Option<String>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");
        Self::from_lookup(migrate_only, |name| env::var(name).ok())
    }

    pub fn from_lookup(
        migrate_only: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let api_host = lookup("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = lookup("API_PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);

        let counter_store = match lookup("COUNTER_STORE")
            .unwrap_or_else(|| "postgres".to_owned())
            .as_str()
        {
            "postgres" => CounterStoreConfig::Postgres {
                database_url: required_non_empty(&lookup, "DATABASE_URL")?,
            },
            "redis" => CounterStoreConfig::Redis {
                redis_url: required_non_empty(&lookup, "REDIS_URL")?,
                key_prefix: lookup("REDIS_KEY_PREFIX")
                    .filter(|value| !value.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_REDIS_KEY_PREFIX.to_owned()),
            },
            "memory" => CounterStoreConfig::Memory,
            other => {
                return Err(AppError::Validation(format!(
                    "COUNTER_STORE must be one of 'postgres', 'redis' or 'memory', got '{other}'"
                )));
            }
        };

        let dedupe_window = match lookup("VIEW_DEDUPE_WINDOW_SECONDS") {
            Some(value) => {
                let seconds = value.trim().parse::<i64>().map_err(|error| {
                    AppError::Validation(format!("invalid VIEW_DEDUPE_WINDOW_SECONDS: {error}"))
                })?;
                DedupeWindow::from_seconds(seconds)?
            }
            None => DedupeWindow::default(),
        };

        let cors_allowed_origin =
            lookup("CORS_ALLOWED_ORIGIN").filter(|value| !value.trim().is_empty());

        Ok(Self {
            migrate_only,
            api_host,
            api_port,
            counter_store,
            dedupe_window,
            cors_allowed_origin,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, AppError> {
    let value = lookup(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}
