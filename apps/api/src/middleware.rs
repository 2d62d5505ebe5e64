use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use viewbadge_domain::ClientId;

const FORWARDED_FOR_HEADER: &str = "x-forwarded-for";

/// Client a request is attributed to, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentifier(pub ClientId);

pub async fn resolve_client_identifier(mut request: Request, next: Next) -> Response {
    let peer_address = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| *address);
    let client_id = client_identifier(request.headers(), peer_address);

    request.extensions_mut().insert(ClientIdentifier(client_id));
    next.run(request).await
}

/// Prefers the first `X-Forwarded-For` hop, then the peer IP, then the empty string.
pub fn client_identifier(headers: &HeaderMap, peer_address: Option<SocketAddr>) -> ClientId {
    let forwarded = headers
        .get(FORWARDED_FOR_HEADER)
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
        .and_then(|value| {
            value
                .split(',')
                .next()
                .map(str::trim)
                .filter(|hop| !hop.is_empty())
                .map(ToOwned::to_owned)
        });

    let identifier = forwarded
        .or_else(|| peer_address.map(|address| address.ip().to_string()))
        .unwrap_or_default();

    ClientId::new(identifier)
}
