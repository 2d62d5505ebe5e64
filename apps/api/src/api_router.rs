use axum::Router;
use axum::middleware::from_fn;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use viewbadge_core::AppError;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(
    app_state: AppState,
    cors_allowed_origin: Option<&str>,
) -> Result<Router, AppError> {
    let view_routes = Router::new()
        .route(
            "/api/views/{key}",
            get(handlers::views::view_badge_handler),
        )
        .route_layer(from_fn(middleware::resolve_client_identifier));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .merge(view_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(cors_allowed_origin)?)
        .with_state(app_state))
}
