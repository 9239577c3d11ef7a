//! Kiosk device and invite models.

use muster_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `devices` table.
///
/// `key_hash` is never serialized.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Device {
    pub id: DbId,
    pub organisation_id: DbId,
    pub station_id: DbId,
    pub name: String,
    #[serde(skip_serializing)]
    pub key_hash: String,
    pub key_prefix: String,
    pub active: bool,
    pub last_seen_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `kiosk_invites` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct KioskInvite {
    pub id: DbId,
    pub organisation_id: DbId,
    pub station_id: DbId,
    #[serde(skip_serializing)]
    pub passphrase_hash: String,
    pub phrase_display: String,
    pub expires_at: Timestamp,
    pub used: bool,
    pub used_at: Option<Timestamp>,
    pub device_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// Insert for a new invite.
#[derive(Debug, Clone)]
pub struct NewInvite {
    pub organisation_id: DbId,
    pub station_id: DbId,
    pub passphrase_hash: String,
    pub phrase_display: String,
    pub expires_at: Timestamp,
    pub created_by: Option<DbId>,
}

/// Insert for a newly registered device.
#[derive(Debug, Clone)]
pub struct NewDevice {
    pub name: String,
    pub key_hash: String,
    pub key_prefix: String,
}
