//! HTTP-level integration tests for the `/api/admin` and `/api/analytics`
//! endpoints.

mod common;

use std::net::IpAddr;
use std::sync::Arc;

use axum::http::StatusCode;
use common::{
    body_json, create_card, delete_auth, get, get_auth, login_from, patch_json_auth, post_auth,
    user_with_token, TEST_PASSWORD,
};
use futurist_api::security::{InMemoryAttemptStore, LoginAttemptStore};
use futurist_core::roles::Role;
use serde_json::json;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Access control
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn admin_routes_reject_non_admins(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, business) = user_with_token(&pool, &app, "biz@example.com", Role::Business).await;

    assert_eq!(get(&app, "/api/admin/users").await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        get_auth(&app, "/api/admin/users", &business).await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        get_auth(&app, "/api/admin/stats", &business).await.status(),
        StatusCode::FORBIDDEN
    );
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn list_users_filters_by_role_and_search(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, admin) = user_with_token(&pool, &app, "boss@example.com", Role::Admin).await;
    common::create_user(&pool, "alice@shop.com", Role::Business).await;
    common::create_user(&pool, "bob@home.com", Role::User).await;

    let json = body_json(get_auth(&app, "/api/admin/users", &admin).await).await;
    assert_eq!(json["pagination"]["total"], 3);

    let json = body_json(get_auth(&app, "/api/admin/users?role=Business", &admin).await).await;
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["data"][0]["email"], "alice@shop.com");

    let json = body_json(get_auth(&app, "/api/admin/users?search=HOME", &admin).await).await;
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["data"][0]["email"], "bob@home.com");

    let bad = get_auth(&app, "/api/admin/users?role=wizard", &admin).await;
    assert_eq!(bad.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn role_change_updates_capabilities(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin_user, admin) = user_with_token(&pool, &app, "boss@example.com", Role::Admin).await;
    let (user, _) = user_with_token(&pool, &app, "grow@example.com", Role::User).await;

    let response = patch_json_auth(
        &app,
        &format!("/api/admin/users/{}/role", user.id),
        &admin,
        json!({ "role": "business" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["role"], "business");
    assert_eq!(json["data"]["is_business"], true);
    assert_eq!(json["data"]["is_admin"], false);

    let own = patch_json_auth(
        &app,
        &format!("/api/admin/users/{}/role", admin_user.id),
        &admin,
        json!({ "role": "user" }),
    )
    .await;
    assert_eq!(own.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn deactivated_user_is_locked_out(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin_user, admin) = user_with_token(&pool, &app, "boss@example.com", Role::Admin).await;
    let (user, token) = user_with_token(&pool, &app, "naughty@example.com", Role::User).await;

    let response = patch_json_auth(
        &app,
        &format!("/api/admin/users/{}/status", user.id),
        &admin,
        json!({ "is_active": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_active"], false);

    // Existing tokens stop working and new logins are refused.
    assert_eq!(
        get_auth(&app, "/api/auth/profile", &token).await.status(),
        StatusCode::FORBIDDEN
    );
    let relog = login_from(&app, "10.9.9.9", "naughty@example.com", TEST_PASSWORD).await;
    assert_eq!(relog.status(), StatusCode::FORBIDDEN);

    let self_deactivate = patch_json_auth(
        &app,
        &format!("/api/admin/users/{}/status", admin_user.id),
        &admin,
        json!({ "is_active": false }),
    )
    .await;
    assert_eq!(self_deactivate.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn delete_user_keeps_record_visible_to_admin(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (admin_user, admin) = user_with_token(&pool, &app, "boss@example.com", Role::Admin).await;
    let (user, token) = user_with_token(&pool, &app, "gone@example.com", Role::Business).await;
    let card = create_card(&app, &token, json!({ "title": "Orphan" })).await;

    let uri = format!("/api/admin/users/{}", user.id);
    assert_eq!(delete_auth(&app, &uri, &admin).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(delete_auth(&app, &uri, &admin).await.status(), StatusCode::NOT_FOUND);

    let json = body_json(get_auth(&app, &uri, &admin).await).await;
    assert!(json["data"]["deleted_at"].is_string());
    assert_eq!(json["data"]["is_active"], false);

    let listing = body_json(get_auth(&app, "/api/admin/users", &admin).await).await;
    assert_eq!(listing["pagination"]["total"], 1);
    let listing =
        body_json(get_auth(&app, "/api/admin/users?include_deleted=true", &admin).await).await;
    assert_eq!(listing["pagination"]["total"], 2);

    let card_uri = format!("/api/cards/{}", card["id"]);
    assert_eq!(get(&app, &card_uri).await.status(), StatusCode::NOT_FOUND);

    let own = format!("/api/admin/users/{}", admin_user.id);
    assert_eq!(delete_auth(&app, &own, &admin).await.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn card_moderation(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, admin) = user_with_token(&pool, &app, "boss@example.com", Role::Admin).await;
    let (_, owner) = user_with_token(&pool, &app, "biz@example.com", Role::Business).await;
    let card = create_card(&app, &owner, json!({ "title": "Spammy" })).await;
    create_card(&app, &owner, json!({ "title": "Drafty", "is_public": false })).await;
    let id = card["id"].as_i64().unwrap();

    // Bump a view, then reset it.
    get(&app, &format!("/api/cards/{id}")).await;
    let reset = post_auth(&app, &format!("/api/admin/cards/{id}/reset-views"), &admin).await;
    assert_eq!(reset.status(), StatusCode::OK);
    assert_eq!(body_json(reset).await["data"]["views"], 0);

    let response = patch_json_auth(
        &app,
        &format!("/api/admin/cards/{id}/status"),
        &admin,
        json!({ "is_active": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(get(&app, &format!("/api/cards/{id}")).await.status(), StatusCode::NOT_FOUND);

    let all = body_json(get_auth(&app, "/api/admin/cards", &admin).await).await;
    assert_eq!(all["pagination"]["total"], 2);
    let inactive =
        body_json(get_auth(&app, "/api/admin/cards?is_active=false", &admin).await).await;
    assert_eq!(inactive["pagination"]["total"], 1);
    assert_eq!(inactive["data"][0]["title"], "Spammy");

    // Admins see private cards in the public listing too.
    let listing = body_json(get_auth(&app, "/api/cards?is_public=false", &admin).await).await;
    assert_eq!(listing["data"][0]["title"], "Drafty");
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn platform_stats(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, admin) = user_with_token(&pool, &app, "boss@example.com", Role::Admin).await;
    let (_, owner) = user_with_token(&pool, &app, "biz@example.com", Role::Business).await;
    let (_, fan) = user_with_token(&pool, &app, "fan@example.com", Role::User).await;
    let card = create_card(&app, &owner, json!({ "title": "Popular", "category": "tech" })).await;
    create_card(&app, &owner, json!({ "title": "Quiet", "is_public": false })).await;
    post_auth(&app, &format!("/api/cards/{}/like", card["id"]), &fan).await;
    post_auth(&app, &format!("/api/favorites/{}", card["id"]), &fan).await;
    get(&app, &format!("/api/cards/{}", card["id"])).await;

    let response = get_auth(&app, "/api/admin/stats", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await["data"].clone();
    assert_eq!(stats["total_users"], 3);
    assert_eq!(stats["active_users"], 3);
    assert_eq!(stats["new_users_30d"], 3);
    assert_eq!(stats["total_cards"], 2);
    assert_eq!(stats["public_cards"], 1);
    assert_eq!(stats["total_views"], 1);
    assert_eq!(stats["total_likes"], 1);
    assert_eq!(stats["total_favorites"], 1);
    assert_eq!(stats["top_categories"][0]["category"], "tech");
    assert_eq!(stats["users_by_role"].as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn owner_analytics(pool: PgPool) {
    let app = common::build_test_app(pool.clone());
    let (_, owner) = user_with_token(&pool, &app, "biz@example.com", Role::Business).await;
    let (_, fan) = user_with_token(&pool, &app, "fan@example.com", Role::User).await;
    let hit = create_card(&app, &owner, json!({ "title": "Hit" })).await;
    create_card(&app, &owner, json!({ "title": "Miss" })).await;
    for _ in 0..3 {
        get(&app, &format!("/api/cards/{}", hit["id"])).await;
    }
    post_auth(&app, &format!("/api/cards/{}/like", hit["id"]), &fan).await;

    let response = get_auth(&app, "/api/analytics/my-cards", &owner).await;
    assert_eq!(response.status(), StatusCode::OK);
    let stats = body_json(response).await["data"].clone();
    assert_eq!(stats["total_cards"], 2);
    assert_eq!(stats["total_views"], 3);
    assert_eq!(stats["total_likes"], 1);
    assert_eq!(stats["cards"][0]["title"], "Hit");

    let plain = get_auth(&app, "/api/analytics/my-cards", &fan).await;
    assert_eq!(plain.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Security
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn blocked_ips_can_be_listed_and_lifted(pool: PgPool) {
    let config = common::test_config();
    let store = Arc::new(InMemoryAttemptStore::new(config.lockout.clone()));
    let app = common::build_test_app_with(pool.clone(), config, store.clone());
    let (_, admin) = user_with_token(&pool, &app, "boss@example.com", Role::Admin).await;

    let ip: IpAddr = "203.0.113.77".parse().unwrap();
    store.block(ip).await;

    let json = body_json(get_auth(&app, "/api/admin/security/blocked", &admin).await).await;
    assert_eq!(json["data"][0]["ip"], "203.0.113.77");
    assert!(json["data"][0]["remaining_secs"].as_i64().unwrap() > 0);

    let uri = "/api/admin/security/blocked/203.0.113.77";
    assert_eq!(delete_auth(&app, uri, &admin).await.status(), StatusCode::NO_CONTENT);
    assert_eq!(delete_auth(&app, uri, &admin).await.status(), StatusCode::NOT_FOUND);
    assert!(store.blocked_ips().await.is_empty());

    let invalid = delete_auth(&app, "/api/admin/security/blocked/not-an-ip", &admin).await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
}
