//! Public kiosk registration: trade an invite passphrase for a device key.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use muster_core::error::CoreError;
use muster_core::kiosk::{generate_device_key, hash_passphrase, DEFAULT_DEVICE_NAME};
use muster_core::types::DbId;
use muster_db::models::device::NewDevice;
use muster_db::repositories::InviteRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(alias = "phrase", alias = "code")]
    pub passphrase: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub device_id: DbId,
    /// Shown once. The kiosk stores it and sends it as its bearer token.
    pub kiosk_key: String,
    pub station_id: DbId,
}

/// POST /api/v1/kiosk/register
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<Json<RegisterResponse>> {
    let invalid = || AppError::Core(CoreError::Unauthorized("Invalid or expired invite".into()));

    if input.passphrase.trim().is_empty() {
        return Err(invalid());
    }

    let digest = hash_passphrase(&state.config.kiosk.invite_pepper, &input.passphrase);
    let invite = InviteRepo::find_by_passphrase_hash(&state.pool, &digest)
        .await?
        .ok_or_else(invalid)?;

    if invite.used {
        return Err(AppError::Core(CoreError::Conflict(
            "Invite has already been used".into(),
        )));
    }
    if invite.expires_at <= Utc::now() {
        return Err(invalid());
    }

    let key = generate_device_key();
    let new_device = NewDevice {
        name: DEFAULT_DEVICE_NAME.to_string(),
        key_hash: key.hash,
        key_prefix: key.prefix,
    };

    // A concurrent redemption may have claimed the invite since the read above.
    let device = InviteRepo::redeem(&state.pool, invite.id, &new_device)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict("Invite has already been used".into()))
        })?;

    tracing::info!(
        device_id = device.id,
        organisation_id = device.organisation_id,
        station_id = device.station_id,
        invite_id = invite.id,
        "Kiosk registered",
    );

    Ok(Json(RegisterResponse {
        device_id: device.id,
        kiosk_key: key.plaintext,
        station_id: device.station_id,
    }))
}
