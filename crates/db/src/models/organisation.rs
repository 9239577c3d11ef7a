//! Organisation and station models.

use muster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A brigade. `timezone` is an IANA name used for local-day reporting.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organisation {
    pub id: DbId,
    pub name: String,
    pub timezone: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A fire station. Kiosks are bound to exactly one; `code` is stored
/// upper-case and unique within the organisation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Station {
    pub id: DbId,
    pub organisation_id: DbId,
    pub name: String,
    pub code: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a station.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateStation {
    pub name: String,
    pub code: String,
}
