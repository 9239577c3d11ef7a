//! Repository for the `kiosk_invites` table and device registration.

use muster_core::types::DbId;
use sqlx::PgPool;

use crate::models::device::{Device, KioskInvite, NewDevice, NewInvite};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organisation_id, station_id, passphrase_hash, phrase_display, \
                       expires_at, used, used_at, device_id, created_by, created_at";

const DEVICE_COLUMNS: &str = "id, organisation_id, station_id, name, key_hash, key_prefix, \
                              active, last_seen_at, created_at, updated_at";

pub struct InviteRepo;

impl InviteRepo {
    pub async fn create(pool: &PgPool, input: &NewInvite) -> Result<KioskInvite, sqlx::Error> {
        let query = format!(
            "INSERT INTO kiosk_invites
                (organisation_id, station_id, passphrase_hash, phrase_display, expires_at,
                 created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, KioskInvite>(&query)
            .bind(input.organisation_id)
            .bind(input.station_id)
            .bind(&input.passphrase_hash)
            .bind(&input.phrase_display)
            .bind(input.expires_at)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// Invites of an organisation, newest first.
    pub async fn list(
        pool: &PgPool,
        organisation_id: DbId,
    ) -> Result<Vec<KioskInvite>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM kiosk_invites
             WHERE organisation_id = $1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, KioskInvite>(&query)
            .bind(organisation_id)
            .fetch_all(pool)
            .await
    }

    /// Find an invite by passphrase digest, whatever its state.
    pub async fn find_by_passphrase_hash(
        pool: &PgPool,
        passphrase_hash: &str,
    ) -> Result<Option<KioskInvite>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM kiosk_invites WHERE passphrase_hash = $1");
        sqlx::query_as::<_, KioskInvite>(&query)
            .bind(passphrase_hash)
            .fetch_optional(pool)
            .await
    }

    /// Consume an invite and create its device in one transaction.
    ///
    /// The invite is claimed with a `used = false` guard, so of two
    /// concurrent redemptions exactly one gets a device; the other gets `None`.
    /// Expired invites are never claimed.
    pub async fn redeem(
        pool: &PgPool,
        invite_id: DbId,
        device: &NewDevice,
    ) -> Result<Option<Device>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let claimed: Option<(DbId, DbId)> = sqlx::query_as(
            "UPDATE kiosk_invites SET used = true, used_at = NOW()
             WHERE id = $1 AND used = false AND expires_at > NOW()
             RETURNING organisation_id, station_id",
        )
        .bind(invite_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((organisation_id, station_id)) = claimed else {
            return Ok(None);
        };

        let insert = format!(
            "INSERT INTO devices (organisation_id, station_id, name, key_hash, key_prefix)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {DEVICE_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Device>(&insert)
            .bind(organisation_id)
            .bind(station_id)
            .bind(&device.name)
            .bind(&device.key_hash)
            .bind(&device.key_prefix)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE kiosk_invites SET device_id = $2 WHERE id = $1")
            .bind(invite_id)
            .bind(created.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(created))
    }
}
