//! Repository for the `devices` table.

use muster_core::types::DbId;
use sqlx::PgPool;

use crate::models::device::Device;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organisation_id, station_id, name, key_hash, key_prefix, active, \
                       last_seen_at, created_at, updated_at";

/// Provides kiosk device lookups and admin writes.
pub struct DeviceRepo;

impl DeviceRepo {
    /// Find an active device by the SHA-256 hash of its bearer key.
    pub async fn find_active_by_key_hash(
        pool: &PgPool,
        key_hash: &str,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM devices WHERE key_hash = $1 AND active = true");
        sqlx::query_as::<_, Device>(&query)
            .bind(key_hash)
            .fetch_optional(pool)
            .await
    }

    /// Stamp `last_seen_at` with the current time.
    pub async fn touch_last_seen(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE devices SET last_seen_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn find_by_id(
        pool: &PgPool,
        organisation_id: DbId,
        id: DbId,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM devices WHERE id = $1 AND organisation_id = $2");
        sqlx::query_as::<_, Device>(&query)
            .bind(id)
            .bind(organisation_id)
            .fetch_optional(pool)
            .await
    }

    /// All devices of an organisation, active first, then newest first.
    pub async fn list(pool: &PgPool, organisation_id: DbId) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM devices
             WHERE organisation_id = $1
             ORDER BY active DESC, created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(organisation_id)
            .fetch_all(pool)
            .await
    }

    /// Returns `None` if no device with the given `id` exists in the organisation.
    pub async fn rename(
        pool: &PgPool,
        organisation_id: DbId,
        id: DbId,
        name: &str,
    ) -> Result<Option<Device>, sqlx::Error> {
        let query = format!(
            "UPDATE devices SET name = $3
             WHERE id = $1 AND organisation_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(id)
            .bind(organisation_id)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Revoke a device by setting `active = false`. Its key stops working
    /// immediately. Returns `true` if the row was updated.
    pub async fn deactivate(
        pool: &PgPool,
        organisation_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE devices SET active = false
             WHERE id = $1 AND organisation_id = $2 AND active = true",
        )
        .bind(id)
        .bind(organisation_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
