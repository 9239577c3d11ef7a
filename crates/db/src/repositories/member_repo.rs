//! Repository for the `members` and `member_tags` tables.

use muster_core::member::MEMBER_ARCHIVED;
use muster_core::types::DbId;
use sqlx::PgPool;

use crate::models::member::{
    Member, MemberChanges, MemberListParams, MemberWithTag, NewMember, TagChange,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organisation_id, member_number, first_name, last_name, mobile, \
                       mobile_normalized, status, is_visitor, created_at, updated_at";

/// Same columns, qualified for queries that join on `members m`.
const M_COLUMNS: &str = "m.id, m.organisation_id, m.member_number, m.first_name, m.last_name, \
                         m.mobile, m.mobile_normalized, m.status, m.is_visitor, m.created_at, \
                         m.updated_at";

/// Most recently bound active tag of `m`, exposed as `rfid_tag`.
const TAG_JOIN: &str = "LEFT JOIN LATERAL (
        SELECT t.tag_value FROM member_tags t
        WHERE t.member_id = m.id AND t.active = true
        ORDER BY t.updated_at DESC
        LIMIT 1
    ) tag ON true";

const DEFAULT_LIST_LIMIT: i64 = 100;
const MAX_LIST_LIMIT: i64 = 500;

/// Provides member lookups and admin writes.
pub struct MemberRepo;

impl MemberRepo {
    pub async fn find_by_id(
        pool: &PgPool,
        organisation_id: DbId,
        id: DbId,
    ) -> Result<Option<Member>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM members WHERE id = $1 AND organisation_id = $2");
        sqlx::query_as::<_, Member>(&query)
            .bind(id)
            .bind(organisation_id)
            .fetch_optional(pool)
            .await
    }

    /// Member with their current tag, for the admin detail view.
    pub async fn find_with_tag(
        pool: &PgPool,
        organisation_id: DbId,
        id: DbId,
    ) -> Result<Option<MemberWithTag>, sqlx::Error> {
        let query = format!(
            "SELECT {M_COLUMNS}, tag.tag_value AS rfid_tag
             FROM members m {TAG_JOIN}
             WHERE m.id = $1 AND m.organisation_id = $2"
        );
        sqlx::query_as::<_, MemberWithTag>(&query)
            .bind(id)
            .bind(organisation_id)
            .fetch_optional(pool)
            .await
    }

    /// Admin member list ordered by last name, first name, id.
    ///
    /// Archived members are hidden unless `status` asks for them; visitors
    /// are hidden unless `include_visitors` is set.
    pub async fn list(
        pool: &PgPool,
        organisation_id: DbId,
        params: &MemberListParams,
    ) -> Result<Vec<MemberWithTag>, sqlx::Error> {
        let query = format!(
            "SELECT {M_COLUMNS}, tag.tag_value AS rfid_tag
             FROM members m {TAG_JOIN}
             WHERE m.organisation_id = $1
               AND ($2::text IS NULL
                    OR m.first_name ILIKE $2
                    OR m.last_name ILIKE $2
                    OR m.member_number ILIKE $2)
               AND (($3::text IS NULL AND m.status <> '{MEMBER_ARCHIVED}') OR m.status = $3)
               AND ($4 OR m.is_visitor = false)
             ORDER BY m.last_name, m.first_name, m.id
             LIMIT $5 OFFSET $6"
        );
        let pattern = params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(|q| format!("%{q}%"));
        let limit = params
            .limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        sqlx::query_as::<_, MemberWithTag>(&query)
            .bind(organisation_id)
            .bind(pattern)
            .bind(&params.status)
            .bind(params.include_visitors)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Insert a regular member and, optionally, bind a tag, in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &NewMember,
        tag: Option<&str>,
    ) -> Result<Member, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO members
                (organisation_id, member_number, first_name, last_name, mobile,
                 mobile_normalized, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        let member = sqlx::query_as::<_, Member>(&query)
            .bind(input.organisation_id)
            .bind(&input.member_number)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.mobile)
            .bind(&input.mobile_normalized)
            .bind(&input.status)
            .fetch_one(&mut *tx)
            .await?;

        if let Some(tag) = tag {
            Self::assign_tag_inner(&mut tx, member.organisation_id, member.id, tag).await?;
        }

        tx.commit().await?;
        Ok(member)
    }

    /// Apply `changes` and `tag` to a member in one transaction.
    ///
    /// Returns `None` if the member does not exist in the organisation.
    pub async fn update(
        pool: &PgPool,
        organisation_id: DbId,
        id: DbId,
        changes: &MemberChanges,
        tag: &TagChange,
    ) -> Result<Option<Member>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (set_mobile, mobile, mobile_normalized) = match &changes.mobile {
            None => (false, None, None),
            Some(None) => (true, None, None),
            Some(Some((raw, normalized))) => (true, Some(raw.as_str()), Some(normalized.as_str())),
        };

        let query = format!(
            "UPDATE members SET
                member_number = COALESCE($3, member_number),
                first_name = COALESCE($4, first_name),
                last_name = COALESCE($5, last_name),
                mobile = CASE WHEN $6 THEN $7 ELSE mobile END,
                mobile_normalized = CASE WHEN $6 THEN $8 ELSE mobile_normalized END,
                status = COALESCE($9, status)
             WHERE id = $1 AND organisation_id = $2
             RETURNING {COLUMNS}"
        );
        let member = sqlx::query_as::<_, Member>(&query)
            .bind(id)
            .bind(organisation_id)
            .bind(&changes.member_number)
            .bind(&changes.first_name)
            .bind(&changes.last_name)
            .bind(set_mobile)
            .bind(mobile)
            .bind(mobile_normalized)
            .bind(&changes.status)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(member) = member else {
            return Ok(None);
        };

        match tag {
            TagChange::Keep => {}
            TagChange::Assign(value) => {
                Self::assign_tag_inner(&mut tx, organisation_id, member.id, value).await?;
            }
            TagChange::Clear => {
                sqlx::query(
                    "UPDATE member_tags SET active = false
                     WHERE member_id = $1 AND active = true",
                )
                .bind(member.id)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(Some(member))
    }

    /// Set a member's status to archived. Returns `true` if the row changed.
    pub async fn archive(
        pool: &PgPool,
        organisation_id: DbId,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE members SET status = $3
             WHERE id = $1 AND organisation_id = $2 AND status <> $3",
        )
        .bind(id)
        .bind(organisation_id)
        .bind(MEMBER_ARCHIVED)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Scan lookups (non-visitor members only)
    // -----------------------------------------------------------------------

    /// Member bound to an active tag with exactly this value.
    pub async fn find_by_tag(
        pool: &PgPool,
        organisation_id: DbId,
        tag: &str,
    ) -> Result<Option<Member>, sqlx::Error> {
        let query = format!(
            "SELECT {M_COLUMNS}
             FROM member_tags t
             JOIN members m ON m.id = t.member_id
             WHERE t.organisation_id = $1
               AND t.tag_value = $2
               AND t.active = true
               AND m.is_visitor = false"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(organisation_id)
            .bind(tag)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_member_number(
        pool: &PgPool,
        organisation_id: DbId,
        member_number: &str,
    ) -> Result<Option<Member>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM members
             WHERE organisation_id = $1 AND member_number = $2 AND is_visitor = false"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(organisation_id)
            .bind(member_number)
            .fetch_optional(pool)
            .await
    }

    /// Active members sharing a normalized mobile, ordered for candidate display.
    pub async fn find_active_by_mobile(
        pool: &PgPool,
        organisation_id: DbId,
        mobile_normalized: &str,
    ) -> Result<Vec<Member>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM members
             WHERE organisation_id = $1
               AND mobile_normalized = $2
               AND status = 'active'
               AND is_visitor = false
             ORDER BY last_name, first_name, id"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(organisation_id)
            .bind(mobile_normalized)
            .fetch_all(pool)
            .await
    }

    /// Non-visitor member by id, whatever their status.
    pub async fn find_regular_by_id(
        pool: &PgPool,
        organisation_id: DbId,
        id: DbId,
    ) -> Result<Option<Member>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM members
             WHERE id = $1 AND organisation_id = $2 AND is_visitor = false"
        );
        sqlx::query_as::<_, Member>(&query)
            .bind(id)
            .bind(organisation_id)
            .fetch_optional(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Bind `tag` to the member, moving it off anyone else who holds it and
    /// retiring the member's other tags.
    async fn assign_tag_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        organisation_id: DbId,
        member_id: DbId,
        tag: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE member_tags SET active = false
             WHERE member_id = $1 AND tag_value <> $2 AND active = true",
        )
        .bind(member_id)
        .bind(tag)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            "INSERT INTO member_tags (organisation_id, member_id, tag_value)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_member_tags_org_value
             DO UPDATE SET member_id = EXCLUDED.member_id, active = true",
        )
        .bind(organisation_id)
        .bind(member_id)
        .bind(tag)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
