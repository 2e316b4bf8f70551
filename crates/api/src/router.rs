//! Application router and HTTP perimeter.
//!
//! [`build_app_router`] is shared by `main.rs` and the integration tests so
//! both exercise the same layers.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::handlers;
use crate::middleware::security_headers::security_headers_middleware;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the `/api` tree, the JSON 404 fallback and the perimeter layers.
///
/// Outermost first, a request passes through CORS, request-id assignment,
/// tracing, request-id propagation, the timeout, panic recovery, compression
/// and finally the security headers.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let app = Router::new()
        .nest("/api", routes::api_routes(config))
        .fallback(handlers::not_found);

    with_perimeter(app, config).with_state(state)
}

fn with_perimeter(app: Router<AppState>, config: &ServerConfig) -> Router<AppState> {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let timeout = Duration::from_secs(config.request_timeout_secs);

    app.layer(axum::middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors_layer(config))
}

/// CORS for the configured front-end origins.
///
/// `Retry-After` and the request id are exposed so the browser client can
/// show lockout countdowns and quote ids in bug reports.
///
/// Panics at startup if any configured origin is not a valid header value.
fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse()
                .unwrap_or_else(|e| panic!("CORS_ORIGINS entry '{origin}' is invalid: {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .expose_headers([RETRY_AFTER, HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
        .max_age(Duration::from_secs(600))
}
