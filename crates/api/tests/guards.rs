//! Request guards and middleware that never reach the database: token
//! checks, the development auth fallback, IP blocks, rate limits, the JSON
//! fallback route and response hardening headers.

mod common;

use std::net::IpAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use common::{
    body_json, delete, get, get_auth, lazy_pool, login_from, post_json, put_json, send,
};
use futurist_api::auth::jwt::{generate_token, Claims};
use futurist_api::config::ServerConfig;
use futurist_api::middleware::auth::{DEV_USER_EMAIL, DEV_USER_ID};
use futurist_api::security::{InMemoryAttemptStore, LoginAttemptStore};
use futurist_core::roles::Role;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

fn app_with(config: ServerConfig) -> Router {
    let store = Arc::new(InMemoryAttemptStore::new(config.lockout.clone()));
    common::build_test_app_with(lazy_pool(), config, store)
}

fn app() -> Router {
    app_with(common::test_config())
}

fn dev_fallback_app() -> Router {
    let mut config = common::test_config();
    config.auth_dev_fallback = true;
    app_with(config)
}

// ---------------------------------------------------------------------------
// Token checks
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_401() {
    let response = get(&app(), "/api/auth/profile").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert_eq!(json["error"], "Not authorized, no token");
}

#[tokio::test]
async fn non_bearer_header_is_401() {
    let request = Request::builder()
        .uri("/api/auth/profile")
        .header(AUTHORIZATION, "Token abc")
        .body(Body::empty())
        .unwrap();
    let response = send(&app(), request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_invalid() {
    let mut other = common::test_config().jwt;
    other.secret = "someone-elses-secret".into();
    let token = generate_token(1, Role::Admin, &other).unwrap();

    let response = get_auth(&app(), "/api/auth/profile", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Not authorized, token invalid");
}

#[tokio::test]
async fn expired_token_is_reported_as_expired() {
    let config = common::test_config();
    let issued = chrono::Utc::now().timestamp() - 7200;
    let claims = Claims {
        sub: 1,
        role: Role::User,
        exp: issued + 3600,
        iat: issued,
        jti: "expired".into(),
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt.secret.as_bytes()),
    )
    .unwrap();

    let response = get_auth(&app(), "/api/auth/profile", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "Not authorized, token expired");
}

#[tokio::test]
async fn card_writes_require_a_token() {
    let app = app();

    let create = post_json(&app, "/api/cards", json!({ "title": "Anon" })).await;
    assert_eq!(create.status(), StatusCode::UNAUTHORIZED);

    let update = put_json(&app, "/api/cards/1", json!({ "title": "Anon" })).await;
    assert_eq!(update.status(), StatusCode::UNAUTHORIZED);

    let remove = delete(&app, "/api/cards/1").await;
    assert_eq!(remove.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(remove).await["error"], "Not authorized, no token");
}

// ---------------------------------------------------------------------------
// Development fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn dev_fallback_attaches_default_user() {
    let response = get(&dev_fallback_app(), "/api/auth/profile").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], DEV_USER_ID);
    assert_eq!(json["data"]["email"], DEV_USER_EMAIL);
    assert_eq!(json["data"]["role"], "business");
}

#[tokio::test]
async fn dev_fallback_reads_unverified_payload() {
    let token = encode(
        &Header::default(),
        &json!({ "sub": 42, "role": "admin", "email": "qa@futurist.local" }),
        &EncodingKey::from_secret(b"not-the-server-secret"),
    )
    .unwrap();

    let response = get_auth(&dev_fallback_app(), "/api/auth/profile", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], 42);
    assert_eq!(json["data"]["is_admin"], true);
    assert_eq!(json["data"]["email"], "qa@futurist.local");
}

#[tokio::test]
async fn dev_fallback_is_ignored_in_production() {
    let mut config = common::test_config();
    config.auth_dev_fallback = true;
    config.environment = futurist_api::config::AppEnvironment::Production;

    let response = get(&app_with(config), "/api/auth/profile").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn dev_user_cannot_write_account_data() {
    let app = dev_fallback_app();

    // Business role passes the role check; the missing account row does not.
    let create = post_json(&app, "/api/cards", json!({ "title": "Demo card" })).await;
    assert_eq!(create.status(), StatusCode::FORBIDDEN);
    let json = body_json(create).await;
    assert_eq!(json["code"], "FORBIDDEN");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Development user has no stored account"));

    for uri in ["/api/favorites", "/api/cards/my-cards", "/api/analytics/my-cards"] {
        let response = get(&app, uri).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
    }

    let remove = delete(&app, "/api/auth/account").await;
    assert_eq!(remove.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dev_admin_payload_cannot_moderate() {
    let token = encode(
        &Header::default(),
        &json!({ "sub": 7, "role": "admin" }),
        &EncodingKey::from_secret(b"not-the-server-secret"),
    )
    .unwrap();

    let response = get_auth(&dev_fallback_app(), "/api/admin/stats", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_guard_rejects_before_touching_data() {
    // The synthetic user is a business account, not an admin.
    let response = get(&dev_fallback_app(), "/api/admin/stats").await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

// ---------------------------------------------------------------------------
// Lockout and rate limiting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn blocked_ip_gets_429_before_credentials_are_checked() {
    let config = common::test_config();
    let store = Arc::new(InMemoryAttemptStore::new(config.lockout.clone()));
    let ip: IpAddr = "198.51.100.23".parse().unwrap();
    store.block(ip).await;
    let app = common::build_test_app_with(lazy_pool(), config, store);

    let response = login_from(&app, "198.51.100.23", "anyone@example.com", "whatever").await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(RETRY_AFTER));
    let json = body_json(response).await;
    assert_eq!(json["code"], "TOO_MANY_ATTEMPTS");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Too many failed login attempts"));
}

#[tokio::test]
async fn auth_rate_limit_throttles_bursts() {
    let mut config = common::test_config();
    config.rate_limit.enabled = true;
    config.rate_limit.auth_period_secs = 60;
    config.rate_limit.auth_burst = 2;
    let app = app_with(config);

    let register = || {
        Request::builder()
            .method(Method::POST)
            .uri("/api/auth/register")
            .header(CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", "192.0.2.50")
            .body(Body::from("{}"))
            .unwrap()
    };

    // Empty registrations fail validation without touching the database.
    assert_eq!(send(&app, register()).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(send(&app, register()).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        send(&app, register()).await.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
}

// ---------------------------------------------------------------------------
// Fallback and headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_is_json_404() {
    let response = get(&app(), "/api/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Route not found");
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let response = get(&app(), "/api/does-not-exist").await;
    let headers = response.headers();
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
    assert!(headers.contains_key("content-security-policy"));
    assert!(headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let response = get(&app(), "/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert_eq!(json["environment"], "test");
}
