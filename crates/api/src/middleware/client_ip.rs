//! Client IP resolution shared by the login tracker and the rate limiter.

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap};

use crate::state::AppState;

/// Address used when neither a trusted header nor the socket peer is known.
pub const UNKNOWN_IP: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// The caller's IP address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(ClientIp(resolve_client_ip(
            &parts.headers,
            &parts.extensions,
            state.config.trust_proxy_headers,
        )))
    }
}

/// Resolve the client IP.
///
/// Proxy headers are only consulted when `trust_proxy_headers` is set, since
/// any client can forge them.
pub fn resolve_client_ip(
    headers: &HeaderMap,
    extensions: &Extensions,
    trust_proxy_headers: bool,
) -> IpAddr {
    if trust_proxy_headers {
        if let Some(ip) = ip_from_proxy_headers(headers) {
            return ip;
        }
    }
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(UNKNOWN_IP)
}

/// Checks `CF-Connecting-IP`, then the first `X-Forwarded-For` hop, then
/// `X-Real-IP`.
fn ip_from_proxy_headers(headers: &HeaderMap) -> Option<IpAddr> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    header("cf-connecting-ip")
        .and_then(|s| s.trim().parse().ok())
        .or_else(|| {
            header("x-forwarded-for")
                .and_then(|s| s.split(',').next())
                .and_then(|s| s.trim().parse().ok())
        })
        .or_else(|| header("x-real-ip").and_then(|s| s.trim().parse().ok()))
}
