//! Repository for the `sessions` and `session_tasks` tables.
//!
//! Session writes that touch more than one row run in a single transaction.
//! The one-open-session-per-member rule is enforced by the
//! `uq_sessions_member_open` partial unique index; [`AttendanceRepo::open`]
//! turns a lost race on that index into [`OpenOutcome::AlreadyOpen`].

use muster_core::types::DbId;
use sqlx::PgPool;

use crate::is_unique_violation;
use crate::models::attendance::{
    CloseSession, NewAllocation, NewSession, OpenOutcome, Session, SessionTask, SessionWithMember,
};
use crate::models::member::{Member, NewVisitor};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organisation_id, station_id, member_id, device_id, status, \
                       start_time, end_time, duration_minutes, raw_checkin_at, raw_checkout_at, \
                       visitor_agency, visitor_purpose, created_at, updated_at";

/// Session columns qualified for joins on `sessions s`, plus member fields.
const JOINED_COLUMNS: &str = "s.id, s.organisation_id, s.station_id, s.member_id, s.device_id, \
                              s.status, s.start_time, s.end_time, s.duration_minutes, \
                              s.raw_checkin_at, s.raw_checkout_at, s.visitor_agency, \
                              s.visitor_purpose, s.created_at, s.updated_at, \
                              m.first_name, m.last_name, m.member_number, m.is_visitor";

const TASK_COLUMNS: &str = "id, session_id, category_id, minutes, notes, \
                            category_code_snapshot, category_name_snapshot, created_at";

const MEMBER_COLUMNS: &str = "id, organisation_id, member_number, first_name, last_name, \
                              mobile, mobile_normalized, status, is_visitor, created_at, \
                              updated_at";

const OPEN_SESSION_INDEX: &str = "uq_sessions_member_open";

/// Provides the session lifecycle writes and kiosk-facing reads.
pub struct AttendanceRepo;

impl AttendanceRepo {
    /// The member's open session, if any.
    pub async fn find_open_for_member(
        pool: &PgPool,
        member_id: DbId,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM sessions WHERE member_id = $1 AND status = 'open'");
        sqlx::query_as::<_, Session>(&query)
            .bind(member_id)
            .fetch_optional(pool)
            .await
    }

    /// Open a session stamped now, unless the member already has one.
    pub async fn open(pool: &PgPool, input: &NewSession) -> Result<OpenOutcome, sqlx::Error> {
        if let Some(existing) = Self::find_open_for_member(pool, input.member_id).await? {
            return Ok(OpenOutcome::AlreadyOpen(existing));
        }

        let query = format!(
            "INSERT INTO sessions (organisation_id, station_id, member_id, device_id, start_time)
             VALUES ($1, $2, $3, $4, NOW())
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Session>(&query)
            .bind(input.organisation_id)
            .bind(input.station_id)
            .bind(input.member_id)
            .bind(input.device_id)
            .fetch_one(pool)
            .await;

        match inserted {
            Ok(session) => Ok(OpenOutcome::Opened(session)),
            Err(err) if is_unique_violation(&err, OPEN_SESSION_INDEX) => {
                tracing::debug!(member_id = input.member_id, "Concurrent check-in lost the race");
                match Self::find_open_for_member(pool, input.member_id).await? {
                    Some(existing) => Ok(OpenOutcome::AlreadyOpen(existing)),
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Create a fresh visitor member and their open session in one transaction.
    pub async fn open_visitor(
        pool: &PgPool,
        visitor: &NewVisitor,
        station_id: DbId,
        device_id: DbId,
        agency: Option<&str>,
        purpose: Option<&str>,
    ) -> Result<(Member, Session), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let member_query = format!(
            "INSERT INTO members
                (organisation_id, member_number, first_name, last_name, mobile,
                 mobile_normalized, is_visitor)
             VALUES ($1, $2, $3, $4, $5, $6, true)
             RETURNING {MEMBER_COLUMNS}"
        );
        let member = sqlx::query_as::<_, Member>(&member_query)
            .bind(visitor.organisation_id)
            .bind(&visitor.member_number)
            .bind(&visitor.first_name)
            .bind(&visitor.last_name)
            .bind(&visitor.mobile)
            .bind(&visitor.mobile_normalized)
            .fetch_one(&mut *tx)
            .await?;

        let session_query = format!(
            "INSERT INTO sessions
                (organisation_id, station_id, member_id, device_id, start_time,
                 visitor_agency, visitor_purpose)
             VALUES ($1, $2, $3, $4, NOW(), $5, $6)
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, Session>(&session_query)
            .bind(member.organisation_id)
            .bind(station_id)
            .bind(member.id)
            .bind(device_id)
            .bind(agency)
            .bind(purpose)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok((member, session))
    }

    /// A session with its member, scoped to a device's organisation and station.
    pub async fn find_scoped(
        pool: &PgPool,
        organisation_id: DbId,
        station_id: DbId,
        id: DbId,
    ) -> Result<Option<SessionWithMember>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM sessions s
             JOIN members m ON m.id = s.member_id
             WHERE s.id = $1 AND s.organisation_id = $2 AND s.station_id = $3"
        );
        sqlx::query_as::<_, SessionWithMember>(&query)
            .bind(id)
            .bind(organisation_id)
            .bind(station_id)
            .fetch_optional(pool)
            .await
    }

    /// Open sessions at a station, newest first.
    pub async fn list_open_at_station(
        pool: &PgPool,
        organisation_id: DbId,
        station_id: DbId,
    ) -> Result<Vec<SessionWithMember>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM sessions s
             JOIN members m ON m.id = s.member_id
             WHERE s.organisation_id = $1 AND s.station_id = $2 AND s.status = 'open'
             ORDER BY s.start_time DESC, s.id DESC"
        );
        sqlx::query_as::<_, SessionWithMember>(&query)
            .bind(organisation_id)
            .bind(station_id)
            .fetch_all(pool)
            .await
    }

    /// Allocation rows of a session, in the order they were written.
    pub async fn tasks_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<SessionTask>, sqlx::Error> {
        let query = format!(
            "SELECT {TASK_COLUMNS} FROM session_tasks WHERE session_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, SessionTask>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// Close an open session and write its allocation rows atomically.
    ///
    /// Returns `None` (and writes nothing) if the session was no longer open
    /// when the update ran. The allocated categories are share-locked and
    /// their current code and name copied into each row. An allocation to a
    /// missing or inactive category fails with `RowNotFound` and rolls the
    /// whole checkout back.
    pub async fn close(
        pool: &PgPool,
        session_id: DbId,
        input: &CloseSession,
        allocations: &[NewAllocation],
    ) -> Result<Option<(Session, Vec<SessionTask>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let close_query = format!(
            "UPDATE sessions SET
                status = 'closed',
                end_time = $2,
                duration_minutes = $3,
                raw_checkout_at = NOW(),
                visitor_agency = COALESCE($4, visitor_agency),
                visitor_purpose = COALESCE($5, visitor_purpose)
             WHERE id = $1 AND status = 'open'
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, Session>(&close_query)
            .bind(session_id)
            .bind(input.end_time)
            .bind(input.duration_minutes as i32)
            .bind(&input.visitor_agency)
            .bind(&input.visitor_purpose)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(session) = session else {
            return Ok(None);
        };

        let category_ids: Vec<DbId> = allocations.iter().map(|a| a.category_id).collect();
        sqlx::query("SELECT id FROM categories WHERE id = ANY($1) ORDER BY id FOR SHARE")
            .bind(&category_ids)
            .execute(&mut *tx)
            .await?;

        let insert = format!(
            "INSERT INTO session_tasks
                (session_id, category_id, minutes, notes, category_code_snapshot,
                 category_name_snapshot)
             SELECT $1, c.id, $3, $4, c.code, c.name
             FROM categories c
             WHERE c.id = $2 AND c.organisation_id = $5 AND c.active = true
             RETURNING {TASK_COLUMNS}"
        );
        let mut tasks = Vec::with_capacity(allocations.len());
        for allocation in allocations {
            let task = sqlx::query_as::<_, SessionTask>(&insert)
                .bind(session.id)
                .bind(allocation.category_id)
                .bind(allocation.minutes as i32)
                .bind(&allocation.notes)
                .bind(session.organisation_id)
                .fetch_one(&mut *tx)
                .await?;
            tasks.push(task);
        }

        tx.commit().await?;
        Ok(Some((session, tasks)))
    }
}
