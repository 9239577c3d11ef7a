//! Admin handlers for kiosk devices and invites (`/admin/kiosks`).
//!
//! The invite passphrase is returned **only** on creation; it is stored as a
//! peppered digest plus a masked hint. Devices list their key prefix, never the key.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{Duration, Utc};
use muster_core::error::CoreError;
use muster_core::kiosk::{
    clamp_invite_days, generate_passphrase, hash_passphrase, passphrase_hint,
};
use muster_core::types::{DbId, Timestamp};
use muster_db::models::device::NewInvite;
use muster_db::repositories::{DeviceRepo, InviteRepo, StationRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::admin::AdminContext;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RenameDeviceRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateInviteRequest {
    pub station_id: DbId,
    pub expires_days: Option<i64>,
}

/// Returned once when an invite is created.
#[derive(Debug, Serialize)]
pub struct InviteCreatedResponse {
    pub id: DbId,
    pub station_id: DbId,
    pub passphrase: String,
    pub expires_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/kiosks/devices
pub async fn list_devices(
    admin: AdminContext,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let devices = DeviceRepo::list(&state.pool, admin.organisation_id).await?;
    Ok(Json(DataResponse { data: devices }))
}

/// PUT /api/v1/admin/kiosks/devices/{id}
pub async fn rename_device(
    RequireManager(admin): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RenameDeviceRequest>,
) -> AppResult<impl IntoResponse> {
    let name = input.name.trim();
    if name.is_empty() || name.len() > 100 {
        return Err(AppError::BadRequest("name must be 1-100 characters".into()));
    }
    let device = DeviceRepo::rename(&state.pool, admin.organisation_id, id, name)
        .await?
        .ok_or(device_not_found(id))?;
    tracing::info!(device_id = id, admin_id = admin.admin_id, "Kiosk renamed");
    Ok(Json(DataResponse { data: device }))
}

/// DELETE /api/v1/admin/kiosks/devices/{id}
///
/// Deactivates the device; its key stops authenticating immediately.
pub async fn deactivate_device(
    RequireManager(admin): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deactivated = DeviceRepo::deactivate(&state.pool, admin.organisation_id, id).await?;
    if !deactivated
        && DeviceRepo::find_by_id(&state.pool, admin.organisation_id, id)
            .await?
            .is_none()
    {
        return Err(device_not_found(id));
    }
    if deactivated {
        tracing::info!(device_id = id, admin_id = admin.admin_id, "Kiosk deactivated");
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Invites
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/kiosks/invites
pub async fn list_invites(
    admin: AdminContext,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let invites = InviteRepo::list(&state.pool, admin.organisation_id).await?;
    Ok(Json(DataResponse { data: invites }))
}

/// POST /api/v1/admin/kiosks/invites
pub async fn create_invite(
    RequireManager(admin): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CreateInviteRequest>,
) -> AppResult<impl IntoResponse> {
    StationRepo::find_by_id(&state.pool, admin.organisation_id, input.station_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Station",
            id: input.station_id,
        }))?;

    let days = clamp_invite_days(input.expires_days);
    let passphrase = generate_passphrase();
    let invite = InviteRepo::create(
        &state.pool,
        &NewInvite {
            organisation_id: admin.organisation_id,
            station_id: input.station_id,
            passphrase_hash: hash_passphrase(
                &state.config.kiosk.invite_pepper,
                &passphrase.canonical,
            ),
            phrase_display: passphrase_hint(&passphrase.display),
            expires_at: Utc::now() + Duration::days(days),
            created_by: Some(admin.admin_id),
        },
    )
    .await?;

    tracing::info!(
        invite_id = invite.id,
        station_id = invite.station_id,
        expires_days = days,
        admin_id = admin.admin_id,
        "Kiosk invite created",
    );

    let response = InviteCreatedResponse {
        id: invite.id,
        station_id: invite.station_id,
        passphrase: passphrase.display,
        expires_at: invite.expires_at,
    };
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

fn device_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Device",
        id,
    })
}
