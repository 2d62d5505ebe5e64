//! View badge API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::net::SocketAddr;

use tracing::info;
use viewbadge_core::AppError;

use crate::api_config::{ApiConfig, CounterStoreConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    if config.migrate_only {
        return match &config.counter_store {
            CounterStoreConfig::Postgres { database_url } => {
                api_services::connect_and_migrate(database_url).await?;
                info!("database migrations applied successfully");
                Ok(())
            }
            other => {
                info!(
                    store = other.name(),
                    "counter store has no migrations to apply"
                );
                Ok(())
            }
        };
    }

    let app_state = api_services::build_app_state(&config).await?;
    let app = api_router::build_router(app_state, config.cors_allowed_origin.as_deref())?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "viewbadge-api listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
