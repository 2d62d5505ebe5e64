use std::sync::Arc;

use tracing::info;
use viewbadge_application::{CounterRepository, ViewCounterService};
use viewbadge_core::AppError;
use viewbadge_infrastructure::{
    InMemoryCounterRepository, PostgresCounterRepository, RedisCounterRepository,
};

use crate::api_config::{ApiConfig, CounterStoreConfig};
use crate::state::{AppState, StoreProbe};

use super::database::connect_and_migrate;
use super::redis::connect_redis;

pub async fn build_app_state(config: &ApiConfig) -> Result<AppState, AppError> {
    let (repository, store_probe): (Arc<dyn CounterRepository>, StoreProbe) =
        match &config.counter_store {
            CounterStoreConfig::Postgres { database_url } => {
                let pool = connect_and_migrate(database_url).await?;
                (
                    Arc::new(PostgresCounterRepository::new(pool.clone())),
                    StoreProbe::Postgres(pool),
                )
            }
            CounterStoreConfig::Redis {
                redis_url,
                key_prefix,
            } => {
                let client = connect_redis(redis_url).await?;
                (
                    Arc::new(RedisCounterRepository::new(
                        client.clone(),
                        key_prefix.as_str(),
                    )),
                    StoreProbe::Redis(client),
                )
            }
            CounterStoreConfig::Memory => {
                (Arc::new(InMemoryCounterRepository::new()), StoreProbe::Memory)
            }
        };

    info!(
        store = config.counter_store.name(),
        window_seconds = config.dedupe_window.duration().num_seconds(),
        "view counter store ready"
    );

    Ok(AppState {
        view_counter_service: ViewCounterService::new(repository, config.dedupe_window),
        store_probe,
    })
}
