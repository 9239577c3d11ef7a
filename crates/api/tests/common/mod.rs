//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use muster_api::auth::jwt::{issue_access_token, JwtConfig};
use muster_api::auth::password::hash_password;
use muster_api::config::{KioskConfig, ServerConfig};
use muster_api::router::build_app_router;
use muster_api::state::AppState;
use muster_core::kiosk::generate_device_key;
use muster_core::phone::normalize_au_mobile;
use muster_core::types::DbId;
use muster_db::models::admin::{AdminUser, NewAdminUser};
use muster_db::models::category::{Category, NewCategory};
use muster_db::models::device::{NewDevice, NewInvite};
use muster_db::models::member::{Member, NewMember};
use muster_db::models::organisation::CreateStation;
use muster_db::repositories::{
    AdminUserRepo, CategoryRepo, InviteRepo, MemberRepo, OrganisationRepo, StationRepo,
};
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_PEPPER: &str = "test-invite-pepper";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-jwt-secret-not-for-production".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        kiosk: KioskConfig {
            invite_pepper: TEST_PEPPER.to_string(),
            checkout_tolerance_mins: 5,
        },
    }
}

/// Build the full application router, using the given database pool.
///
/// Uses the same builder as `main.rs` so tests exercise the production
/// middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    build_app_router(AppState::new(pool, config.clone()), &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// GET with `Authorization: Bearer <token>`. The token may be an admin JWT
/// or a kiosk device key.
pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    json_request(app, Method::POST, uri, None, body).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    json_request(app, Method::POST, uri, Some(token), body).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    json_request(app, Method::PUT, uri, Some(token), body).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

async fn json_request(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: serde_json::Value,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// An organisation with one station and one registered kiosk.
pub struct TestKiosk {
    pub organisation_id: DbId,
    pub station_id: DbId,
    pub device_id: DbId,
    /// Plaintext device key, sent as the bearer token.
    pub key: String,
}

pub async fn kiosk(pool: &PgPool) -> TestKiosk {
    let org = OrganisationRepo::create(pool, "Test Brigade", "Australia/Sydney")
        .await
        .unwrap();
    kiosk_in(pool, org.id, "CEN").await
}

/// A new station in an existing organisation, with its own kiosk.
pub async fn kiosk_in(pool: &PgPool, organisation_id: DbId, station_code: &str) -> TestKiosk {
    let station = StationRepo::create(
        pool,
        organisation_id,
        &CreateStation {
            name: format!("Station {station_code}"),
            code: station_code.to_string(),
        },
    )
    .await
    .unwrap();

    let invite = InviteRepo::create(
        pool,
        &NewInvite {
            organisation_id,
            station_id: station.id,
            passphrase_hash: format!("fixture-{}", generate_device_key().plaintext),
            phrase_display: "fixture-****".to_string(),
            expires_at: chrono::Utc::now() + chrono::Duration::days(1),
            created_by: None,
        },
    )
    .await
    .unwrap();
    let key = generate_device_key();
    let device = InviteRepo::redeem(
        pool,
        invite.id,
        &NewDevice {
            name: "Kiosk".to_string(),
            key_hash: key.hash,
            key_prefix: key.prefix,
        },
    )
    .await
    .unwrap()
    .unwrap();

    TestKiosk {
        organisation_id,
        station_id: station.id,
        device_id: device.id,
        key: key.plaintext,
    }
}

pub async fn member(
    pool: &PgPool,
    organisation_id: DbId,
    number: &str,
    first: &str,
    mobile: Option<&str>,
) -> Member {
    MemberRepo::create(
        pool,
        &NewMember {
            organisation_id,
            member_number: number.to_string(),
            first_name: first.to_string(),
            last_name: "Tester".to_string(),
            mobile: mobile.map(str::to_string),
            mobile_normalized: mobile.and_then(normalize_au_mobile),
            status: "active".to_string(),
        },
        None,
    )
    .await
    .unwrap()
}

pub async fn category(
    pool: &PgPool,
    organisation_id: DbId,
    parent_id: Option<DbId>,
    code: &str,
    name: &str,
) -> Category {
    let sort = CategoryRepo::next_sort(pool, organisation_id, parent_id)
        .await
        .unwrap();
    CategoryRepo::create(
        pool,
        &NewCategory {
            organisation_id,
            parent_id,
            code: code.to_string(),
            name: name.to_string(),
            sort,
        },
    )
    .await
    .unwrap()
}

/// Create an admin with [`TEST_PASSWORD`].
pub async fn admin(pool: &PgPool, organisation_id: DbId, username: &str, role: &str) -> AdminUser {
    AdminUserRepo::create(
        pool,
        &NewAdminUser {
            organisation_id,
            username: username.to_string(),
            email: format!("{username}@brigade.test"),
            password_hash: hash_password(TEST_PASSWORD).unwrap(),
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
}

/// Access token for `admin`, signed with the test secret.
pub fn token_for(admin: &AdminUser) -> String {
    issue_access_token(admin.id, admin.organisation_id, &admin.role, &test_config().jwt)
        .unwrap()
}

/// A fresh `end_time` string for checkout bodies.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
