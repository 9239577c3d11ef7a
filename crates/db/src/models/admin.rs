//! Admin user and refresh-session models.

use muster_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Someone who signs in to the admin console of one organisation.
/// `role` is `owner`, `admin` or `staff`; staff are read-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminUser {
    pub id: DbId,
    pub organisation_id: DbId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Insert for an admin user. `password_hash` is an Argon2id PHC string.
#[derive(Debug, Clone)]
pub struct NewAdminUser {
    pub organisation_id: DbId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

/// One refresh token's lifetime. Consumed on rotation, revoked on logout.
#[derive(Debug, Clone, FromRow)]
pub struct AdminSession {
    pub id: DbId,
    pub admin_user_id: DbId,
    pub refresh_token_hash: String,
    pub expires_at: Timestamp,
    pub is_revoked: bool,
    pub created_at: Timestamp,
}
