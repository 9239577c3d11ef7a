//! Repositories for the `organisations` and `stations` tables.

use muster_core::types::DbId;
use sqlx::PgPool;

use crate::models::organisation::{CreateStation, Organisation, Station};

const ORG_COLUMNS: &str = "id, name, timezone, created_at, updated_at";

const STATION_COLUMNS: &str = "id, organisation_id, name, code, active, created_at, updated_at";

pub struct OrganisationRepo;

impl OrganisationRepo {
    pub async fn create(
        pool: &PgPool,
        name: &str,
        timezone: &str,
    ) -> Result<Organisation, sqlx::Error> {
        let query = format!(
            "INSERT INTO organisations (name, timezone) VALUES ($1, $2) RETURNING {ORG_COLUMNS}"
        );
        sqlx::query_as::<_, Organisation>(&query)
            .bind(name)
            .bind(timezone)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Organisation>, sqlx::Error> {
        let query = format!("SELECT {ORG_COLUMNS} FROM organisations WHERE id = $1");
        sqlx::query_as::<_, Organisation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Number of organisations; zero means the database has never been bootstrapped.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM organisations")
            .fetch_one(pool)
            .await
    }
}

pub struct StationRepo;

impl StationRepo {
    pub async fn create(
        pool: &PgPool,
        organisation_id: DbId,
        input: &CreateStation,
    ) -> Result<Station, sqlx::Error> {
        let query = format!(
            "INSERT INTO stations (organisation_id, name, code)
             VALUES ($1, $2, $3)
             RETURNING {STATION_COLUMNS}"
        );
        sqlx::query_as::<_, Station>(&query)
            .bind(organisation_id)
            .bind(&input.name)
            .bind(&input.code)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        organisation_id: DbId,
        id: DbId,
    ) -> Result<Option<Station>, sqlx::Error> {
        let query = format!(
            "SELECT {STATION_COLUMNS} FROM stations WHERE id = $1 AND organisation_id = $2"
        );
        sqlx::query_as::<_, Station>(&query)
            .bind(id)
            .bind(organisation_id)
            .fetch_optional(pool)
            .await
    }

    /// All stations of an organisation, by name.
    pub async fn list(pool: &PgPool, organisation_id: DbId) -> Result<Vec<Station>, sqlx::Error> {
        let query = format!(
            "SELECT {STATION_COLUMNS} FROM stations
             WHERE organisation_id = $1
             ORDER BY name, id"
        );
        sqlx::query_as::<_, Station>(&query)
            .bind(organisation_id)
            .fetch_all(pool)
            .await
    }
}
