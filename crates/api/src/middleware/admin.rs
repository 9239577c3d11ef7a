//! Admin authentication extractor.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use muster_core::error::CoreError;
use muster_core::roles::can_manage;
use muster_core::types::DbId;

use super::bearer_token;
use crate::auth::jwt::verify_access_token;
use crate::error::AppError;
use crate::state::AppState;

/// The admin behind a request, taken from the claims of its access token.
///
/// Handlers scope every query by `organisation_id`; an admin can never see
/// another organisation's rows.
#[derive(Debug, Clone)]
pub struct AdminContext {
    pub admin_id: DbId,
    pub organisation_id: DbId,
    pub role: String,
}

impl AdminContext {
    pub fn can_manage(&self) -> bool {
        can_manage(&self.role)
    }
}

impl FromRequestParts<AppState> for AdminContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Missing bearer token".into()))
        })?;

        let claims = verify_access_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected admin access token");
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AdminContext {
            admin_id: claims.sub,
            organisation_id: claims.org,
            role: claims.role,
        })
    }
}
