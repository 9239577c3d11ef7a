//! Attendance session and allocation models.

use muster_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: DbId,
    pub organisation_id: DbId,
    pub station_id: DbId,
    pub member_id: DbId,
    pub device_id: Option<DbId>,
    pub status: String,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub duration_minutes: Option<i32>,
    pub raw_checkin_at: Timestamp,
    pub raw_checkout_at: Option<Timestamp>,
    pub visitor_agency: Option<String>,
    pub visitor_purpose: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row from the `session_tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionTask {
    pub id: DbId,
    pub session_id: DbId,
    pub category_id: DbId,
    pub minutes: i32,
    pub notes: Option<String>,
    pub category_code_snapshot: String,
    pub category_name_snapshot: String,
    pub created_at: Timestamp,
}

/// A session joined with the member it belongs to.
#[derive(Debug, Clone, FromRow)]
pub struct SessionWithMember {
    #[sqlx(flatten)]
    pub session: Session,
    pub first_name: String,
    pub last_name: String,
    pub member_number: String,
    pub is_visitor: bool,
}

/// Insert for an open session.
#[derive(Debug, Clone, Copy)]
pub struct NewSession {
    pub organisation_id: DbId,
    pub station_id: DbId,
    pub member_id: DbId,
    pub device_id: DbId,
}

/// One allocation row to write at checkout. The category's code and name
/// are snapshotted when the row is inserted.
#[derive(Debug, Clone)]
pub struct NewAllocation {
    pub category_id: DbId,
    pub minutes: i64,
    pub notes: Option<String>,
}

/// Fields written when a session is closed.
#[derive(Debug, Clone)]
pub struct CloseSession {
    pub end_time: Timestamp,
    pub duration_minutes: i64,
    /// Overrides the agency captured at check-in when present.
    pub visitor_agency: Option<String>,
    pub visitor_purpose: Option<String>,
}

/// Outcome of opening a session.
#[derive(Debug, Clone)]
pub enum OpenOutcome {
    Opened(Session),
    AlreadyOpen(Session),
}
