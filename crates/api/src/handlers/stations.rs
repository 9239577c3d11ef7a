//! Admin handlers for stations (`/admin/stations`).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use muster_db::models::organisation::CreateStation;
use muster_db::repositories::StationRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::admin::AdminContext;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/admin/stations
pub async fn list_stations(
    admin: AdminContext,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let stations = StationRepo::list(&state.pool, admin.organisation_id).await?;
    Ok(Json(DataResponse { data: stations }))
}

/// POST /api/v1/admin/stations
///
/// Station codes are unique per organisation (409 on duplicates).
pub async fn create_station(
    RequireManager(admin): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CreateStation>,
) -> AppResult<impl IntoResponse> {
    let input = CreateStation {
        name: input.name.trim().to_string(),
        code: input.code.trim().to_uppercase(),
    };
    if input.name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    if input.code.is_empty() || input.code.len() > 16 {
        return Err(AppError::BadRequest(
            "code must be 1-16 characters".into(),
        ));
    }

    let station = StationRepo::create(&state.pool, admin.organisation_id, &input).await?;
    tracing::info!(
        station_id = station.id,
        organisation_id = admin.organisation_id,
        admin_id = admin.admin_id,
        "Station created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: station })))
}
