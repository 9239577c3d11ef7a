//! Repositories for the `admin_users` and `admin_sessions` tables.

use muster_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::admin::{AdminSession, AdminUser, NewAdminUser};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, organisation_id, username, email, password_hash, role, is_active, \
                       last_login_at, created_at, updated_at";

const SESSION_COLUMNS: &str =
    "id, admin_user_id, refresh_token_hash, expires_at, is_revoked, created_at";

/// Provides CRUD operations for admin users.
pub struct AdminUserRepo;

impl AdminUserRepo {
    pub async fn create(pool: &PgPool, input: &NewAdminUser) -> Result<AdminUser, sqlx::Error> {
        let query = format!(
            "INSERT INTO admin_users (organisation_id, username, email, password_hash, role)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdminUser>(&query)
            .bind(input.organisation_id)
            .bind(&input.username)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<AdminUser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM admin_users WHERE id = $1");
        sqlx::query_as::<_, AdminUser>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an admin by username (case-sensitive).
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<AdminUser>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM admin_users WHERE username = $1");
        sqlx::query_as::<_, AdminUser>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE admin_users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

/// Provides refresh-token session storage for admin users.
pub struct AdminSessionRepo;

impl AdminSessionRepo {
    pub async fn create(
        pool: &PgPool,
        admin_user_id: DbId,
        refresh_token_hash: &str,
        expires_at: Timestamp,
    ) -> Result<AdminSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO admin_sessions (admin_user_id, refresh_token_hash, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {SESSION_COLUMNS}"
        );
        sqlx::query_as::<_, AdminSession>(&query)
            .bind(admin_user_id)
            .bind(refresh_token_hash)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    /// Revoke the live session holding `refresh_token_hash` and return it.
    ///
    /// Revoked and expired sessions yield `None`. Two concurrent calls with
    /// the same hash cannot both succeed.
    pub async fn consume(
        pool: &PgPool,
        refresh_token_hash: &str,
    ) -> Result<Option<AdminSession>, sqlx::Error> {
        let query = format!(
            "UPDATE admin_sessions SET is_revoked = true
             WHERE refresh_token_hash = $1
               AND is_revoked = false
               AND expires_at > NOW()
             RETURNING {SESSION_COLUMNS}"
        );
        sqlx::query_as::<_, AdminSession>(&query)
            .bind(refresh_token_hash)
            .fetch_optional(pool)
            .await
    }

    /// Revoke all active sessions for an admin. Returns the count revoked.
    pub async fn revoke_all_for_user(
        pool: &PgPool,
        admin_user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE admin_sessions SET is_revoked = true
             WHERE admin_user_id = $1 AND is_revoked = false",
        )
        .bind(admin_user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
