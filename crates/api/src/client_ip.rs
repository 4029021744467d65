//! Client identity for quota accounting and the visit log.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Derive the client identifier for a request: first entry of the
/// `x-forwarded-for` header when present, else the peer address, else
/// the empty-string sentinel.
pub fn client_id(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok());
    let peer = peer.map(|addr| addr.ip().to_string());
    roomstage_core::quota::client_identifier(forwarded, peer.as_deref())
}

/// Extractor for the peer socket address, absent when the server was
/// started without connect info (as in router-level tests).
pub struct PeerAddr(pub Option<SocketAddr>);

impl<S> FromRequestParts<S> for PeerAddr
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(PeerAddr(
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|info| info.0),
        ))
    }
}
