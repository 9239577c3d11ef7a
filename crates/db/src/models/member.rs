//! Member and RFID tag models.

use muster_core::scan::ScanMember;
use muster_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `members` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Member {
    pub id: DbId,
    pub organisation_id: DbId,
    pub member_number: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile: Option<String>,
    pub mobile_normalized: Option<String>,
    pub status: String,
    pub is_visitor: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Member> for ScanMember {
    fn from(m: Member) -> Self {
        ScanMember {
            id: m.id,
            first_name: m.first_name,
            last_name: m.last_name,
            member_number: m.member_number,
            status: m.status,
        }
    }
}

/// A member together with their currently active tag, for admin views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberWithTag {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub member: Member,
    pub rfid_tag: Option<String>,
}

/// A row from the `member_tags` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberTag {
    pub id: DbId,
    pub organisation_id: DbId,
    pub member_id: DbId,
    pub tag_value: String,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Validated insert for a regular member. Mobile is already normalized.
#[derive(Debug, Clone)]
pub struct NewMember {
    pub organisation_id: DbId,
    pub member_number: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile: Option<String>,
    pub mobile_normalized: Option<String>,
    pub status: String,
}

/// Validated patch for a member. `None` leaves a column unchanged.
///
/// `mobile` uses a nested option: `Some(None)` clears the number.
#[derive(Debug, Clone, Default)]
pub struct MemberChanges {
    pub member_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile: Option<Option<(String, String)>>,
    pub status: Option<String>,
}

/// What to do with a member's RFID tag alongside an update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagChange {
    Keep,
    Assign(String),
    Clear,
}

/// Insert for a walk-in visitor.
#[derive(Debug, Clone)]
pub struct NewVisitor {
    pub organisation_id: DbId,
    pub member_number: String,
    pub first_name: String,
    pub last_name: String,
    pub mobile: Option<String>,
    pub mobile_normalized: Option<String>,
}

/// Admin list filter.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberListParams {
    /// Matches first name, last name or member number (case-insensitive).
    pub q: Option<String>,
    pub status: Option<String>,
    #[serde(default)]
    pub include_visitors: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
