use super::checks::check_store;
use super::*;

pub async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = check_store(&state.store_probe).await;

    let ready = store.status == "ok";
    let (status, http_status) = if ready {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    (http_status, Json(HealthResponse { status, store }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::Json;
    use axum::extract::State;
    use axum::http::StatusCode;
    use viewbadge_application::ViewCounterService;
    use viewbadge_domain::DedupeWindow;
    use viewbadge_infrastructure::InMemoryCounterRepository;

    use crate::state::{AppState, StoreProbe};

    use super::health_handler;

    #[tokio::test]
    async fn memory_store_is_always_healthy() {
        let state = AppState {
            view_counter_service: ViewCounterService::new(
                Arc::new(InMemoryCounterRepository::new()),
                DedupeWindow::default(),
            ),
            store_probe: StoreProbe::Memory,
        };

        let (status, Json(payload)) = health_handler(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ok");
        assert_eq!(payload.store.backend, "memory");
        assert!(payload.store.detail.is_none());
    }
}
