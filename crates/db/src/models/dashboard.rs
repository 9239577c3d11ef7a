//! Admin dashboard summary.

use serde::Serialize;
use sqlx::FromRow;

/// Headline counts for one organisation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardStats {
    pub active_members: i64,
    pub open_sessions: i64,
    pub sessions_today: i64,
    pub minutes_today: i64,
    pub active_categories: i64,
    pub active_devices: i64,
}
