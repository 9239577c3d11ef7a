//! Category ordering and code bookkeeping.

mod common;

use assert_matches::assert_matches;
use muster_db::models::attendance::{CloseSession, NewAllocation, NewSession, OpenOutcome};
use muster_db::models::category::{CategoryChanges, CategoryUpdate, MoveDirection};
use muster_db::repositories::{AttendanceRepo, CategoryRepo};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_next_sort_is_per_parent(pool: PgPool) {
    let fx = common::fixture(&pool).await;
    let org = fx.organisation_id;
    let parent = common::category(&pool, org, None, "1", "Operations").await;
    common::category(&pool, org, None, "2", "Training").await;
    common::category(&pool, org, Some(parent.id), "1A", "Fire call").await;

    assert_eq!(CategoryRepo::next_sort(&pool, org, None).await.unwrap(), 3);
    assert_eq!(
        CategoryRepo::next_sort(&pool, org, Some(parent.id)).await.unwrap(),
        2
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_move_swaps_with_sibling(pool: PgPool) {
    let fx = common::fixture(&pool).await;
    let org = fx.organisation_id;
    let a = common::category(&pool, org, None, "1", "Operations").await;
    let b = common::category(&pool, org, None, "2", "Training").await;

    let moved = CategoryRepo::move_category(&pool, org, b.id, MoveDirection::Up)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(moved.sort, a.sort);

    let order: Vec<i64> = CategoryRepo::list(&pool, org)
        .await
        .unwrap()
        .iter()
        .map(|c| c.id)
        .collect();
    assert_eq!(order, [b.id, a.id]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_move_at_edge_is_a_no_op(pool: PgPool) {
    let fx = common::fixture(&pool).await;
    let a = common::category(&pool, fx.organisation_id, None, "1", "Operations").await;

    let unchanged = CategoryRepo::move_category(&pool, fx.organisation_id, a.id, MoveDirection::Up)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.sort, a.sort);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_find_active_many_skips_foreign_and_inactive(pool: PgPool) {
    let ours = common::fixture(&pool).await;
    let theirs = common::fixture(&pool).await;
    let mine = common::category(&pool, ours.organisation_id, None, "1", "Ops").await;
    let retired = common::category(&pool, ours.organisation_id, None, "2", "Retired").await;
    let foreign = common::category(&pool, theirs.organisation_id, None, "1", "Ops").await;
    CategoryRepo::toggle(&pool, ours.organisation_id, retired.id)
        .await
        .unwrap();

    let found = CategoryRepo::find_active_many(
        &pool,
        ours.organisation_id,
        &[mine.id, retired.id, foreign.id],
    )
    .await
    .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, mine.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_code_freezes_once_snapshotted(pool: PgPool) {
    let fx = common::fixture(&pool).await;
    let org = fx.organisation_id;
    let cat = common::category(&pool, org, None, "1", "Training").await;

    // Before any checkout the code is free to change.
    let renumbered = CategoryRepo::update(
        &pool,
        org,
        cat.id,
        &CategoryChanges {
            code: Some("3".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_matches!(renumbered, CategoryUpdate::Updated(c) if c.code == "3");

    let m = common::member(&pool, org, "12345678", "Ada", "Byron", None).await;
    let OpenOutcome::Opened(session) = AttendanceRepo::open(
        &pool,
        &NewSession {
            organisation_id: org,
            station_id: fx.station.id,
            member_id: m.id,
            device_id: fx.device.id,
        },
    )
    .await
    .unwrap() else {
        panic!("expected a new session");
    };
    let (_, tasks) = AttendanceRepo::close(
        &pool,
        session.id,
        &CloseSession {
            end_time: chrono::Utc::now(),
            duration_minutes: 0,
            visitor_agency: None,
            visitor_purpose: None,
        },
        &[NewAllocation {
            category_id: cat.id,
            minutes: 0,
            notes: None,
        }],
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(tasks[0].category_code_snapshot, "3");

    let frozen = CategoryRepo::update(
        &pool,
        org,
        cat.id,
        &CategoryChanges {
            code: Some("4".into()),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_matches!(frozen, CategoryUpdate::CodeFrozen { code } if code == "3");

    let renamed = CategoryRepo::update(
        &pool,
        org,
        cat.id,
        &CategoryChanges {
            name: Some("Drills".into()),
            code: Some("3".into()),
            active: None,
        },
    )
    .await
    .unwrap();
    assert_matches!(renamed, CategoryUpdate::Updated(c) if c.name == "Drills" && c.code == "3");

    let missing = CategoryRepo::update(&pool, org, cat.id + 1_000, &CategoryChanges::default())
        .await
        .unwrap();
    assert_matches!(missing, CategoryUpdate::NotFound);
}
