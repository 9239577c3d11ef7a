//! Device-key authentication extractor for kiosk handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use muster_core::error::CoreError;
use muster_core::kiosk::hash_device_key;
use muster_core::types::DbId;
use muster_db::repositories::DeviceRepo;

use super::bearer_token;
use crate::error::AppError;
use crate::state::AppState;

/// Fallback header for kiosk clients that cannot set `Authorization`.
pub const KIOSK_KEY_HEADER: &str = "x-kiosk-key";

/// The kiosk device making the request.
///
/// Resolved once per request from `Authorization: Bearer <device key>` (or
/// the `x-kiosk-key` header). Every kiosk query is scoped to this device's
/// organisation and station.
#[derive(Debug, Clone)]
pub struct KioskContext {
    pub device_id: DbId,
    pub organisation_id: DbId,
    pub station_id: DbId,
    pub device_name: String,
}

impl FromRequestParts<AppState> for KioskContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let key = presented_key(parts).ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized("Missing kiosk device key".into()))
        })?;

        let device = DeviceRepo::find_active_by_key_hash(&state.pool, &hash_device_key(key))
            .await?
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Invalid or revoked kiosk device key".into(),
                ))
            })?;

        DeviceRepo::touch_last_seen(&state.pool, device.id).await?;

        Ok(KioskContext {
            device_id: device.id,
            organisation_id: device.organisation_id,
            station_id: device.station_id,
            device_name: device.name,
        })
    }
}

/// The device key from the request headers, trimmed. Empty keys count as absent.
fn presented_key(parts: &Parts) -> Option<&str> {
    bearer_token(parts).or_else(|| {
        parts
            .headers
            .get(KIOSK_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|k| !k.is_empty())
    })
}
