//! Visitor check-in and check-out (`/kiosk/visitor`).
//!
//! Visitors are not looked up: every check-in creates a fresh visitor member
//! row alongside its session. Check-out records what the visit was for and
//! never allocates minutes to categories.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use muster_core::attendance::{checkout_window, SESSION_OPEN};
use muster_core::error::{CoreError, Rejection};
use muster_core::member::{visitor_member_number, DEFAULT_VISITOR_LAST_NAME};
use muster_core::phone::normalize_au_mobile;
use muster_core::types::{DbId, Timestamp};
use muster_db::models::attendance::CloseSession;
use muster_db::models::member::NewVisitor;
use muster_db::repositories::AttendanceRepo;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::kiosk::{clean_optional, required_end_time};
use crate::middleware::kiosk::KioskContext;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorCheckinRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile: Option<String>,
    pub agency: Option<String>,
    pub purpose: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorCheckinResponse {
    pub status: &'static str,
    pub session_id: DbId,
    pub member_id: DbId,
    pub start_time: Timestamp,
    pub first_name: String,
    pub is_visitor: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorCheckoutRequest {
    pub session_id: DbId,
    pub end_time: Option<String>,
    pub purpose: Option<String>,
    pub agency: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorCheckoutResponse {
    pub status: &'static str,
    pub session_id: DbId,
    pub total_minutes: i64,
}

/// POST /api/v1/kiosk/visitor/checkin
pub async fn checkin(
    State(state): State<AppState>,
    kiosk: KioskContext,
    Json(input): Json<VisitorCheckinRequest>,
) -> AppResult<Json<VisitorCheckinResponse>> {
    let first_name = clean_optional(input.first_name.as_deref())
        .ok_or(Rejection::MissingField("firstName"))?;
    let last_name = clean_optional(input.last_name.as_deref())
        .unwrap_or_else(|| DEFAULT_VISITOR_LAST_NAME.to_string());

    // A mobile that does not normalize is kept as typed but never matched.
    let mobile = clean_optional(input.mobile.as_deref());
    let mobile_normalized = mobile.as_deref().and_then(normalize_au_mobile);

    let visitor = NewVisitor {
        organisation_id: kiosk.organisation_id,
        member_number: visitor_member_number(Utc::now()),
        first_name,
        last_name,
        mobile,
        mobile_normalized,
    };
    let agency = clean_optional(input.agency.as_deref());
    let purpose = clean_optional(input.purpose.as_deref());

    let (member, session) = AttendanceRepo::open_visitor(
        &state.pool,
        &visitor,
        kiosk.station_id,
        kiosk.device_id,
        agency.as_deref(),
        purpose.as_deref(),
    )
    .await?;

    tracing::info!(
        session_id = session.id,
        member_id = member.id,
        device_id = kiosk.device_id,
        "Visitor checked in",
    );

    Ok(Json(VisitorCheckinResponse {
        status: "checked_in",
        session_id: session.id,
        member_id: member.id,
        start_time: session.start_time,
        first_name: member.first_name,
        is_visitor: true,
    }))
}

/// POST /api/v1/kiosk/visitor/checkout
pub async fn checkout(
    State(state): State<AppState>,
    kiosk: KioskContext,
    Json(input): Json<VisitorCheckoutRequest>,
) -> AppResult<Json<VisitorCheckoutResponse>> {
    let end_time = required_end_time(input.end_time.as_deref())?;
    let purpose =
        clean_optional(input.purpose.as_deref()).ok_or(Rejection::MissingField("purpose"))?;

    let found = AttendanceRepo::find_scoped(
        &state.pool,
        kiosk.organisation_id,
        kiosk.station_id,
        input.session_id,
    )
    .await?
    .ok_or(CoreError::NotFound {
        entity: "Session",
        id: input.session_id,
    })?;

    if found.session.status != SESSION_OPEN {
        return Err(Rejection::SessionNotOpen.into());
    }
    if !found.is_visitor {
        return Err(Rejection::NotVisitorSession.into());
    }

    let window = checkout_window(
        found.session.start_time,
        end_time,
        Utc::now(),
        None,
        state.config.kiosk.checkout_tolerance_mins,
    )?;

    let close = CloseSession {
        end_time: window.end,
        duration_minutes: window.total_minutes,
        visitor_agency: clean_optional(input.agency.as_deref()),
        visitor_purpose: Some(purpose),
    };
    let (session, _) = AttendanceRepo::close(&state.pool, found.session.id, &close, &[])
        .await?
        .ok_or(Rejection::SessionNotOpen)?;

    tracing::info!(
        session_id = session.id,
        member_id = session.member_id,
        device_id = kiosk.device_id,
        total_minutes = window.total_minutes,
        "Visitor checked out",
    );

    Ok(Json(VisitorCheckoutResponse {
        status: "checked_out",
        session_id: session.id,
        total_minutes: window.total_minutes,
    }))
}
