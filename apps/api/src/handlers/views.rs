use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use tracing::{debug, info};
use viewbadge_domain::{ResourceKey, ViewBadge};

use crate::dto::BadgeResponse;
use crate::error::ApiResult;
use crate::middleware::ClientIdentifier;
use crate::state::AppState;

/// Records a view of `key` and returns its badge payload.
pub async fn view_badge_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Extension(ClientIdentifier(client_id)): Extension<ClientIdentifier>,
) -> ApiResult<impl IntoResponse> {
    let key = ResourceKey::new(key)?;
    let recorded = state
        .view_counter_service
        .record_view_now(&key, client_id.clone())
        .await?;

    if recorded.created {
        info!(%key, "created view counter");
    }
    debug!(
        %key,
        client = %client_id,
        counted = recorded.outcome.is_counted(),
        count = recorded.count,
        "recorded badge view"
    );

    Ok((
        [(header::CACHE_CONTROL, "no-cache")],
        Json(BadgeResponse::from(ViewBadge::for_count(recorded.count))),
    ))
}
