//! HTTP-level tests for admin category management.

mod common;

use axum::http::StatusCode;
use common::{body_json, get_auth, now_rfc3339, post_json_auth, put_json_auth};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn create(pool: &PgPool, token: &str, body: Value) -> (StatusCode, Value) {
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/admin/categories", token, body).await;
    let status = response.status();
    (status, body_json(response).await)
}

async fn owner_token(pool: &PgPool) -> (common::TestKiosk, String) {
    let kiosk = common::kiosk(pool).await;
    let owner = common::admin(pool, kiosk.organisation_id, "owner", "owner").await;
    (kiosk, common::token_for(&owner))
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn codes_are_auto_assigned_by_slot(pool: PgPool) {
    let (_, token) = owner_token(&pool).await;

    let (status, first) = create(&pool, &token, json!({ "name": "Training" })).await;
    assert_eq!(status, StatusCode::CREATED, "{first}");
    assert_eq!(first["data"]["code"], "1");

    let (_, second) = create(&pool, &token, json!({ "name": "Maintenance" })).await;
    assert_eq!(second["data"]["code"], "2");

    let parent_id = first["data"]["id"].clone();
    let (_, child_a) = create(&pool, &token, json!({ "name": "Drill", "parent_id": parent_id })).await;
    let (_, child_b) = create(&pool, &token, json!({ "name": "Theory", "parent_id": parent_id })).await;
    assert_eq!(child_a["data"]["code"], "1A");
    assert_eq!(child_b["data"]["code"], "1B");
    assert_eq!(child_a["data"]["sort"], 1);
    assert_eq!(child_b["data"]["sort"], 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn ninth_top_level_category_conflicts(pool: PgPool) {
    let (_, token) = owner_token(&pool).await;
    for i in 1..=8 {
        let (status, _) = create(&pool, &token, json!({ "name": format!("Cat {i}") })).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, json) = create(&pool, &token, json!({ "name": "One too many" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");

    // An explicit code still works.
    let (status, json) = create(&pool, &token, json!({ "name": "Extra", "code": "X9" })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["data"]["code"], "X9");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_or_duplicate_explicit_codes_are_rejected(pool: PgPool) {
    let (_, token) = owner_token(&pool).await;
    create(&pool, &token, json!({ "name": "Training", "code": "TR" })).await;

    let (status, _) = create(&pool, &token, json!({ "name": "Bad", "code": "T-R" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = create(&pool, &token, json!({ "name": "Dup", "code": "TR" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn grandchildren_are_rejected(pool: PgPool) {
    let (_, token) = owner_token(&pool).await;
    let (_, parent) = create(&pool, &token, json!({ "name": "Training" })).await;
    let (_, child) = create(
        &pool,
        &token,
        json!({ "name": "Drill", "parent_id": parent["data"]["id"] }),
    )
    .await;

    let (status, _) = create(
        &pool,
        &token,
        json!({ "name": "Too deep", "parent_id": child["data"]["id"] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn snapshotted_code_is_frozen_but_name_is_not(pool: PgPool) {
    let (kiosk, token) = owner_token(&pool).await;
    let (_, created) = create(&pool, &token, json!({ "name": "Training" })).await;
    let id = created["data"]["id"].as_i64().unwrap();

    // Record a checkout against the category.
    common::member(&pool, kiosk.organisation_id, "12345678", "Ada", None).await;
    let app = common::build_test_app(pool.clone());
    let scan = body_json(
        post_json_auth(app, "/api/v1/kiosk/scan", &kiosk.key, json!({ "identifier": "12345678" }))
            .await,
    )
    .await;
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        "/api/v1/kiosk/checkout",
        &kiosk.key,
        json!({
            "sessionId": scan["sessionId"],
            "endTime": now_rfc3339(),
            "tasks": [{ "categoryId": id }],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let checkout = body_json(response).await;
    assert_eq!(checkout["totalMinutes"], 0);
    assert_eq!(checkout["allocations"][0]["minutes"], 0);
    assert_eq!(checkout["allocations"][0]["code"], "1");

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/categories/{id}"),
        &token,
        json!({ "code": "9" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/categories/{id}"),
        &token,
        json!({ "name": "Training (renamed)", "code": "1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["name"], "Training (renamed)");

    // The recorded allocation keeps the name and code it was written with.
    let app = common::build_test_app(pool);
    let session_id = scan["sessionId"].as_i64().unwrap();
    let response =
        get_auth(app, &format!("/api/v1/kiosk/sessions/{session_id}"), &kiosk.key).await;
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["durationMinutes"], 0);
    assert_eq!(detail["tasks"][0]["categoryId"], id);
    assert_eq!(detail["tasks"][0]["name"], "Training");
    assert_eq!(detail["tasks"][0]["code"], "1");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn toggle_and_move_reorder_tree(pool: PgPool) {
    let (_, token) = owner_token(&pool).await;
    let (_, first) = create(&pool, &token, json!({ "name": "Training" })).await;
    let (_, second) = create(&pool, &token, json!({ "name": "Maintenance" })).await;
    let second_id = second["data"]["id"].as_i64().unwrap();

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/admin/categories/{second_id}/move"),
        &token,
        json!({ "direction": "up" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/admin/categories/{}/toggle", first["data"]["id"]),
        &token,
        json!({}),
    )
    .await;
    assert_eq!(body_json(response).await["data"]["active"], false);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/categories", &token).await;
    let tree = body_json(response).await["data"].clone();
    assert_eq!(tree[0]["name"], "Maintenance");
    assert_eq!(tree[1]["name"], "Training");
    assert_eq!(tree[1]["active"], false);
}
