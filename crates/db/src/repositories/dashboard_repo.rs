//! Aggregate queries for the admin dashboard.

use muster_core::types::DbId;
use sqlx::PgPool;

use crate::models::dashboard::DashboardStats;

pub struct DashboardRepo;

impl DashboardRepo {
    /// Headline counts. "Today" is the current calendar day in the
    /// organisation's timezone.
    pub async fn stats(
        pool: &PgPool,
        organisation_id: DbId,
    ) -> Result<Option<DashboardStats>, sqlx::Error> {
        sqlx::query_as::<_, DashboardStats>(
            "WITH org AS (
                SELECT id,
                       date_trunc('day', NOW() AT TIME ZONE timezone) AT TIME ZONE timezone
                           AS day_start
                FROM organisations
                WHERE id = $1
             )
             SELECT
                (SELECT COUNT(*) FROM members
                  WHERE organisation_id = org.id AND status = 'active' AND is_visitor = false)
                    AS active_members,
                (SELECT COUNT(*) FROM sessions
                  WHERE organisation_id = org.id AND status = 'open')
                    AS open_sessions,
                (SELECT COUNT(*) FROM sessions
                  WHERE organisation_id = org.id AND start_time >= org.day_start)
                    AS sessions_today,
                (SELECT COALESCE(SUM(duration_minutes), 0)::BIGINT FROM sessions
                  WHERE organisation_id = org.id AND status = 'closed'
                    AND end_time >= org.day_start)
                    AS minutes_today,
                (SELECT COUNT(*) FROM categories
                  WHERE organisation_id = org.id AND active = true)
                    AS active_categories,
                (SELECT COUNT(*) FROM devices
                  WHERE organisation_id = org.id AND active = true)
                    AS active_devices
             FROM org",
        )
        .bind(organisation_id)
        .fetch_optional(pool)
        .await
    }
}
