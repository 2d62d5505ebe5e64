use sqlx::PgPool;
use viewbadge_application::ViewCounterService;

/// Handle used by the health check to probe the counter store.
#[derive(Clone)]
pub enum StoreProbe {
    Postgres(PgPool),
    Redis(redis::Client),
    Memory,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub view_counter_service: ViewCounterService,
    pub store_probe: StoreProbe,
}
