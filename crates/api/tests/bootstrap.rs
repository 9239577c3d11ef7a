//! First-run seeding of an empty database.

use muster_api::bootstrap::{seed_if_empty, BootstrapConfig};
use muster_api::error::AppError;
use muster_db::repositories::{AdminUserRepo, OrganisationRepo, StationRepo};
use sqlx::PgPool;

fn config(password: &str) -> BootstrapConfig {
    BootstrapConfig {
        admin_username: "captain".to_string(),
        admin_password: password.to_string(),
        admin_email: "captain@brigade.test".to_string(),
        org_name: "Test Brigade".to_string(),
        org_timezone: "Australia/Perth".to_string(),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seeds_once(pool: PgPool) {
    let seeded = seed_if_empty(&pool, &config("correct-horse-battery"))
        .await
        .unwrap();
    assert!(seeded);

    let owner = AdminUserRepo::find_by_username(&pool, "captain")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(owner.role, "owner");
    let org = OrganisationRepo::find_by_id(&pool, owner.organisation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(org.timezone, "Australia/Perth");
    let stations = StationRepo::list(&pool, org.id).await.unwrap();
    assert_eq!(stations.len(), 1);

    let again = seed_if_empty(&pool, &config("correct-horse-battery"))
        .await
        .unwrap();
    assert!(!again);
    assert_eq!(OrganisationRepo::count(&pool).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn weak_password_is_refused(pool: PgPool) {
    let result = seed_if_empty(&pool, &config("short")).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert_eq!(OrganisationRepo::count(&pool).await.unwrap(), 0);
}
