//! HTTP-level tests for invite creation and kiosk registration.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, post_json, post_json_auth};
use muster_core::kiosk::hash_passphrase;
use muster_db::models::device::NewInvite;
use muster_db::repositories::InviteRepo;
use serde_json::json;
use sqlx::PgPool;

/// Create an invite through the admin API.
///
/// Returns `(organisation_id, station_id, passphrase)`.
async fn admin_invite(pool: &PgPool) -> (i64, i64, String) {
    let kiosk = common::kiosk(pool).await;
    let owner = common::admin(pool, kiosk.organisation_id, "owner", "owner").await;
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/admin/kiosks/invites",
        &common::token_for(&owner),
        json!({ "station_id": kiosk.station_id, "expires_days": 3 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    (
        kiosk.organisation_id,
        kiosk.station_id,
        json["data"]["passphrase"].as_str().unwrap().to_string(),
    )
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn passphrase_registers_exactly_once(pool: PgPool) {
    let (_, station_id, passphrase) = admin_invite(&pool).await;

    // Typed loosely on the kiosk.
    let typed = passphrase.replace('-', " ").to_uppercase();
    let app = common::build_test_app(pool.clone());
    let response = post_json(app, "/api/v1/kiosk/register", json!({ "passphrase": typed })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["stationId"], station_id);
    let key = json["kioskKey"].as_str().unwrap().to_string();
    assert_eq!(key.len(), 48);

    // The new key authenticates kiosk requests.
    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/kiosk/active", &key).await;
    assert_eq!(response.status(), StatusCode::OK);

    // A second redemption conflicts.
    let app = common::build_test_app(pool);
    let response =
        post_json(app, "/api/v1/kiosk/register", json!({ "passphrase": passphrase })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_passphrase_is_unauthorized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/kiosk/register",
        json!({ "passphrase": "ember-bold-spark-0000" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn expired_invite_is_unauthorized(pool: PgPool) {
    let kiosk = common::kiosk(&pool).await;
    InviteRepo::create(
        &pool,
        &NewInvite {
            organisation_id: kiosk.organisation_id,
            station_id: kiosk.station_id,
            passphrase_hash: hash_passphrase(common::TEST_PEPPER, "river-calm-crest-4821"),
            phrase_display: "river-****".into(),
            expires_at: chrono::Utc::now() - chrono::Duration::minutes(1),
            created_by: None,
        },
    )
    .await
    .unwrap();

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/kiosk/register",
        json!({ "phrase": "river-calm-crest-4821" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invite_list_never_shows_the_passphrase(pool: PgPool) {
    let (org, _, passphrase) = admin_invite(&pool).await;
    let staff = common::admin(&pool, org, "staff", "staff").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/kiosks/invites", &common::token_for(&staff)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let body = json.to_string();
    assert!(!body.contains(&passphrase));
    assert!(!body.contains("passphrase_hash"));
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn staff_cannot_create_invites(pool: PgPool) {
    let kiosk = common::kiosk(&pool).await;
    let staff = common::admin(&pool, kiosk.organisation_id, "staff", "staff").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/admin/kiosks/invites",
        &common::token_for(&staff),
        json!({ "station_id": kiosk.station_id }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deactivating_a_device_revokes_its_key(pool: PgPool) {
    let kiosk = common::kiosk(&pool).await;
    let owner = common::admin(&pool, kiosk.organisation_id, "owner", "owner").await;
    let token = common::token_for(&owner);

    let app = common::build_test_app(pool.clone());
    let response = common::delete_auth(
        app,
        &format!("/api/v1/admin/kiosks/devices/{}", kiosk.device_id),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/kiosk/active", &kiosk.key).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let app = common::build_test_app(pool);
    let response = common::delete_auth(app, "/api/v1/admin/kiosks/devices/999999", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
