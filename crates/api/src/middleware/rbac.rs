//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use muster_core::error::CoreError;

use super::admin::AdminContext;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `owner` or `admin` role. Rejects with 403 Forbidden otherwise.
///
/// Read-only `staff` accounts may use the list and detail endpoints through
/// a plain [`AdminContext`] but never reach a handler taking this extractor.
pub struct RequireManager(pub AdminContext);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let admin = AdminContext::from_request_parts(parts, state).await?;
        if !admin.can_manage() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Owner or Admin role required".into(),
            )));
        }
        Ok(RequireManager(admin))
    }
}
