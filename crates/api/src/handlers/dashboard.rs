//! Admin dashboard summary.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use muster_core::error::CoreError;
use muster_db::repositories::DashboardRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::admin::AdminContext;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/dashboard
pub async fn get_dashboard(
    admin: AdminContext,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let stats = DashboardRepo::stats(&state.pool, admin.organisation_id)
        .await?
        .ok_or_else(|| -> AppError {
            CoreError::NotFound {
                entity: "Organisation",
                id: admin.organisation_id,
            }
            .into()
        })?;
    Ok(Json(DataResponse { data: stats }))
}
