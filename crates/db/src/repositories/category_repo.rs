//! Repository for the `categories` table.

use muster_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::category::{
    Category, CategoryChanges, CategoryUpdate, MoveDirection, NewCategory,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, organisation_id, parent_id, code, name, sort, active, created_at, updated_at";

/// Provides category lookups, code bookkeeping and ordering.
pub struct CategoryRepo;

impl CategoryRepo {
    /// All categories of an organisation in display order.
    pub async fn list(pool: &PgPool, organisation_id: DbId) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE organisation_id = $1
             ORDER BY sort, id"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(organisation_id)
            .fetch_all(pool)
            .await
    }

    /// Active categories of an organisation in display order.
    pub async fn list_active(
        pool: &PgPool,
        organisation_id: DbId,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE organisation_id = $1 AND active = true
             ORDER BY sort, id"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(organisation_id)
            .fetch_all(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        organisation_id: DbId,
        id: DbId,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM categories WHERE id = $1 AND organisation_id = $2");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(organisation_id)
            .fetch_optional(pool)
            .await
    }

    /// Active categories among `ids` that belong to the organisation, in no
    /// particular order. Foreign and inactive ids are left out.
    pub async fn find_active_many(
        pool: &PgPool,
        organisation_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE organisation_id = $1 AND id = ANY($2) AND active = true"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(organisation_id)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// Every code in use in the organisation.
    pub async fn codes(pool: &PgPool, organisation_id: DbId) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT code FROM categories WHERE organisation_id = $1")
            .bind(organisation_id)
            .fetch_all(pool)
            .await
    }

    /// Next sort value among the siblings under `parent_id`.
    pub async fn next_sort(
        pool: &PgPool,
        organisation_id: DbId,
        parent_id: Option<DbId>,
    ) -> Result<i32, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(MAX(sort), 0) + 1 FROM categories
             WHERE organisation_id = $1 AND parent_id IS NOT DISTINCT FROM $2",
        )
        .bind(organisation_id)
        .bind(parent_id)
        .fetch_one(pool)
        .await
    }

    pub async fn create(pool: &PgPool, input: &NewCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (organisation_id, parent_id, code, name, sort)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(input.organisation_id)
            .bind(input.parent_id)
            .bind(&input.code)
            .bind(&input.name)
            .bind(input.sort)
            .fetch_one(pool)
            .await
    }

    /// Update name, code and active flag. Only non-`None` values are applied.
    ///
    /// Returns `None` if no category with the given `id` exists in the organisation.
    /// Apply `changes` under a row lock.
    ///
    /// A code change is refused once any allocation has snapshotted the
    /// current code. Checkouts share-lock the category while writing
    /// snapshots, so the check cannot interleave with one.
    pub async fn update(
        pool: &PgPool,
        organisation_id: DbId,
        id: DbId,
        changes: &CategoryChanges,
    ) -> Result<CategoryUpdate, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE id = $1 AND organisation_id = $2
             FOR UPDATE"
        );
        let Some(current) = sqlx::query_as::<_, Category>(&select)
            .bind(id)
            .bind(organisation_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(CategoryUpdate::NotFound);
        };

        let code_changes = changes.code.as_deref().is_some_and(|c| c != current.code);
        if code_changes && Self::is_code_snapshotted(&mut tx, id, &current.code).await? {
            return Ok(CategoryUpdate::CodeFrozen { code: current.code });
        }

        let query = format!(
            "UPDATE categories SET
                name = COALESCE($2, name),
                code = COALESCE($3, code),
                active = COALESCE($4, active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.code)
            .bind(changes.active)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(CategoryUpdate::Updated(updated))
    }

    /// Flip the active flag.
    pub async fn toggle(
        pool: &PgPool,
        organisation_id: DbId,
        id: DbId,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET active = NOT active
             WHERE id = $1 AND organisation_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(organisation_id)
            .fetch_optional(pool)
            .await
    }

    /// Whether any allocation row has snapshotted this category under `code`.
    async fn is_code_snapshotted(
        conn: &mut PgConnection,
        category_id: DbId,
        code: &str,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM session_tasks
                WHERE category_id = $1 AND category_code_snapshot = $2
             )",
        )
        .bind(category_id)
        .bind(code)
        .fetch_one(conn)
        .await
    }

    /// Swap a category's position with its neighbouring sibling.
    ///
    /// A category already at the edge is returned unchanged. Returns `None`
    /// if the category does not exist in the organisation.
    pub async fn move_category(
        pool: &PgPool,
        organisation_id: DbId,
        id: DbId,
        direction: MoveDirection,
    ) -> Result<Option<Category>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let select = format!(
            "SELECT {COLUMNS} FROM categories
             WHERE id = $1 AND organisation_id = $2
             FOR UPDATE"
        );
        let Some(current) = sqlx::query_as::<_, Category>(&select)
            .bind(id)
            .bind(organisation_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let neighbour_query = match direction {
            MoveDirection::Up => format!(
                "SELECT {COLUMNS} FROM categories
                 WHERE organisation_id = $1
                   AND parent_id IS NOT DISTINCT FROM $2
                   AND (sort, id) < ($3, $4)
                 ORDER BY sort DESC, id DESC
                 LIMIT 1
                 FOR UPDATE"
            ),
            MoveDirection::Down => format!(
                "SELECT {COLUMNS} FROM categories
                 WHERE organisation_id = $1
                   AND parent_id IS NOT DISTINCT FROM $2
                   AND (sort, id) > ($3, $4)
                 ORDER BY sort, id
                 LIMIT 1
                 FOR UPDATE"
            ),
        };
        let neighbour = sqlx::query_as::<_, Category>(&neighbour_query)
            .bind(organisation_id)
            .bind(current.parent_id)
            .bind(current.sort)
            .bind(current.id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(neighbour) = neighbour else {
            tx.commit().await?;
            return Ok(Some(current));
        };

        // Equal sorts would make the swap a no-op; nudge past the neighbour instead.
        let new_current_sort = if current.sort != neighbour.sort {
            neighbour.sort
        } else {
            match direction {
                MoveDirection::Up => neighbour.sort - 1,
                MoveDirection::Down => neighbour.sort + 1,
            }
        };

        sqlx::query("UPDATE categories SET sort = $2 WHERE id = $1")
            .bind(neighbour.id)
            .bind(current.sort)
            .execute(&mut *tx)
            .await?;

        let update = format!("UPDATE categories SET sort = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let moved = sqlx::query_as::<_, Category>(&update)
            .bind(current.id)
            .bind(new_current_sort)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(moved))
    }
}
