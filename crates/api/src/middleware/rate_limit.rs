//! Rate limiting middleware using governor and `tower_governor`.
//!
//! - [`auth_rate_limiter`]: strict limits for `/api/auth`
//! - [`api_rate_limiter`]: relaxed limits for the rest of `/api`

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::Request;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::KeyExtractor;
use tower_governor::{GovernorError, GovernorLayer};

use super::client_ip::resolve_client_ip;
use crate::config::RateLimitConfig;

/// Keys requests by client IP, using the same resolution as [`super::client_ip::ClientIp`].
///
/// Never fails: callers without a resolvable address share one bucket.
#[derive(Debug, Clone, Copy)]
pub struct ClientIpKeyExtractor {
    pub trust_proxy_headers: bool,
}

impl KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        Ok(resolve_client_ip(
            req.headers(),
            req.extensions(),
            self.trust_proxy_headers,
        ))
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Limiter for authentication endpoints.
///
/// Defaults: one request replenished every 6 seconds, burst of 10.
///
/// # Panics
///
/// Panics if the configured period or burst is zero.
pub fn auth_rate_limiter(config: &RateLimitConfig, trust_proxy_headers: bool) -> RateLimiterLayer {
    let governor = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor {
            trust_proxy_headers,
        })
        .per_second(config.auth_period_secs)
        .burst_size(config.auth_burst)
        .finish()
        .expect("RATE_LIMIT_AUTH_PERIOD_SECS and RATE_LIMIT_AUTH_BURST must be non-zero");
    GovernorLayer::new(Arc::new(governor))
}

/// Limiter for general API endpoints.
///
/// Defaults: one request replenished every 500 ms, burst of 100.
///
/// # Panics
///
/// Panics if the configured period or burst is zero.
pub fn api_rate_limiter(config: &RateLimitConfig, trust_proxy_headers: bool) -> RateLimiterLayer {
    let governor = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor {
            trust_proxy_headers,
        })
        .per_millisecond(config.api_period_ms)
        .burst_size(config.api_burst)
        .finish()
        .expect("RATE_LIMIT_API_PERIOD_MS and RATE_LIMIT_API_BURST must be non-zero");
    GovernorLayer::new(Arc::new(governor))
}
