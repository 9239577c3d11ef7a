//! Admin sign-in: `/auth/login`, `/auth/refresh` and `/auth/logout`.
//!
//! Every successful login or refresh opens a new row in `admin_sessions`.
//! A refresh token is single-use: presenting it consumes its session.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{Duration, Utc};
use muster_core::error::CoreError;
use muster_core::types::DbId;
use muster_db::models::admin::AdminUser;
use muster_db::repositories::{AdminSessionRepo, AdminUserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{hash_refresh_token, issue_access_token, RefreshToken};
use crate::auth::password::verify_password;
use crate::error::{AppError, AppResult};
use crate::middleware::admin::AdminContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Body of a successful login or refresh.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until `access_token` expires.
    pub expires_in: i64,
    pub user: AdminInfo,
}

#[derive(Debug, Serialize)]
pub struct AdminInfo {
    pub id: DbId,
    pub organisation_id: DbId,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<&AdminUser> for AdminInfo {
    fn from(admin: &AdminUser) -> Self {
        Self {
            id: admin.id,
            organisation_id: admin.organisation_id,
            username: admin.username.clone(),
            email: admin.email.clone(),
            role: admin.role.clone(),
        }
    }
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let Some(admin) = AdminUserRepo::find_by_username(&state.pool, input.username.trim()).await?
    else {
        tracing::info!(username = input.username.trim(), "Login for unknown admin");
        return Err(unauthorized("Invalid username or password"));
    };

    let matches = verify_password(&input.password, &admin.password_hash)
        .map_err(|e| AppError::InternalError(format!("Stored password hash is unreadable: {e}")))?;
    if !matches {
        tracing::info!(admin_id = admin.id, "Login with wrong password");
        return Err(unauthorized("Invalid username or password"));
    }
    let admin = ensure_active(admin)?;

    AdminUserRepo::record_login(&state.pool, admin.id).await?;
    tracing::info!(
        admin_id = admin.id,
        organisation_id = admin.organisation_id,
        "Admin logged in"
    );
    open_session(&state, &admin).await.map(Json)
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<AuthResponse>> {
    let session = AdminSessionRepo::consume(&state.pool, &hash_refresh_token(&input.refresh_token))
        .await?
        .ok_or_else(|| unauthorized("Invalid or expired refresh token"))?;

    let admin = AdminUserRepo::find_by_id(&state.pool, session.admin_user_id)
        .await?
        .ok_or_else(|| unauthorized("Admin account no longer exists"))?;
    let admin = ensure_active(admin)?;

    tracing::debug!(admin_id = admin.id, session_id = session.id, "Refresh token rotated");
    open_session(&state, &admin).await.map(Json)
}

/// POST /api/v1/auth/logout
///
/// Ends every session of the caller, not only the current one.
pub async fn logout(State(state): State<AppState>, admin: AdminContext) -> AppResult<StatusCode> {
    let revoked = AdminSessionRepo::revoke_all_for_user(&state.pool, admin.admin_id).await?;
    tracing::debug!(admin_id = admin.admin_id, revoked, "Admin logged out");
    Ok(StatusCode::NO_CONTENT)
}

fn unauthorized(message: &str) -> AppError {
    CoreError::Unauthorized(message.to_string()).into()
}

fn ensure_active(admin: AdminUser) -> AppResult<AdminUser> {
    if admin.is_active {
        Ok(admin)
    } else {
        Err(CoreError::Forbidden("Account is deactivated".into()).into())
    }
}

/// Sign an access token and store a fresh refresh session for `admin`.
async fn open_session(state: &AppState, admin: &AdminUser) -> AppResult<AuthResponse> {
    let jwt = &state.config.jwt;
    let access_token = issue_access_token(admin.id, admin.organisation_id, &admin.role, jwt)
        .map_err(|e| AppError::InternalError(format!("Cannot sign access token: {e}")))?;

    let refresh = RefreshToken::generate();
    let expires_at = Utc::now() + Duration::days(jwt.refresh_token_expiry_days);
    AdminSessionRepo::create(&state.pool, admin.id, &refresh.hash, expires_at).await?;

    Ok(AuthResponse {
        access_token,
        refresh_token: refresh.plaintext,
        expires_in: jwt.access_token_expiry_secs(),
        user: AdminInfo::from(admin),
    })
}
