use serde::Serialize;
use ts_rs::TS;
use viewbadge_domain::ViewBadge;

/// API error payload.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "error-response.ts")]
pub struct ErrorResponse {
    pub message: String,
}

/// Endpoint badge payload consumed by badge renderers.
#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "badge-response.ts")]
pub struct BadgeResponse {
    pub schema_version: u8,
    pub label: String,
    pub message: String,
    pub color: String,
}

impl From<ViewBadge> for BadgeResponse {
    fn from(value: ViewBadge) -> Self {
        Self {
            schema_version: value.schema_version(),
            label: value.label().to_owned(),
            message: value.message().to_owned(),
            color: value.color().to_owned(),
        }
    }
}

/// Counter store probe result.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "store-health.ts")]
pub struct StoreHealth {
    pub backend: &'static str,
    pub status: &'static str,
    pub detail: Option<String>,
}

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "health-response.ts")]
pub struct HealthResponse {
    pub status: &'static str,
    pub store: StoreHealth,
}
