//! Handlers for the kiosk check-in surface (`/kiosk`).
//!
//! Every handler takes a [`KioskContext`] and scopes its reads and writes to
//! the device's organisation and station. Responses are flat camelCase
//! objects; the kiosk client switches on `status`.

use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use muster_core::allocation::{split_minutes, validate_selection};
use muster_core::attendance::{checkout_window, parse_timestamp, SESSION_OPEN};
use muster_core::error::{CoreError, Rejection};
use muster_core::scan::{resolve_member_id, resolve_scan, Candidate, Resolution};
use muster_core::types::{DbId, Timestamp};
use muster_db::directory::PgMemberDirectory;
use muster_db::models::attendance::{
    CloseSession, NewAllocation, NewSession, OpenOutcome, SessionTask, SessionWithMember,
};
use muster_db::models::category::build_tree;
use muster_db::repositories::{AttendanceRepo, CategoryRepo};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::kiosk::KioskContext;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /kiosk/scan`.
#[derive(Debug, Deserialize)]
pub struct ScanRequest {
    /// Whatever was typed or wedge-scanned: tag, member number or mobile.
    pub identifier: String,
}

/// Request body for `POST /kiosk/scan-as`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanAsRequest {
    pub member_id: DbId,
}

/// Result of a scan. `disabled` is reported as a 403 error instead.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanResponse {
    Unknown,
    Ambiguous { candidates: Vec<Candidate> },
    AlreadyIn(CheckInView),
    CheckedIn(CheckInView),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInView {
    pub session_id: DbId,
    pub member_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub start_time: Timestamp,
    pub matched_by: &'static str,
}

/// Request body for `POST /kiosk/checkout`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub session_id: DbId,
    pub end_time: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskSelection>,
    /// Optional kiosk-side duration, checked against the measured one.
    pub minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSelection {
    pub category_id: DbId,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub status: &'static str,
    pub session_id: DbId,
    pub total_minutes: i64,
    pub allocations: Vec<AllocationView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationView {
    pub category_id: DbId,
    pub code: String,
    pub name: String,
    pub minutes: i32,
    pub notes: Option<String>,
}

impl From<SessionTask> for AllocationView {
    fn from(t: SessionTask) -> Self {
        Self {
            category_id: t.category_id,
            code: t.category_code_snapshot,
            name: t.category_name_snapshot,
            minutes: t.minutes,
            notes: t.notes,
        }
    }
}

/// One row of the station's "who is in" list.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSessionView {
    pub id: DbId,
    pub member_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub is_visitor: bool,
    pub start_time: Timestamp,
    pub visitor_agency: Option<String>,
}

impl From<SessionWithMember> for ActiveSessionView {
    fn from(s: SessionWithMember) -> Self {
        Self {
            id: s.session.id,
            member_id: s.session.member_id,
            first_name: s.first_name,
            last_name: s.last_name,
            is_visitor: s.is_visitor,
            start_time: s.session.start_time,
            visitor_agency: s.session.visitor_agency,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetailView {
    pub id: DbId,
    pub status: String,
    pub member_id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub is_visitor: bool,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub duration_minutes: Option<i32>,
    pub visitor_agency: Option<String>,
    pub visitor_purpose: Option<String>,
    pub tasks: Vec<AllocationView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KioskCategory {
    pub id: DbId,
    pub code: String,
    pub name: String,
    pub children: Vec<KioskCategoryChild>,
}

#[derive(Debug, Serialize)]
pub struct KioskCategoryChild {
    pub id: DbId,
    pub code: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/kiosk/scan
///
/// Resolve a scanned identifier and check the member in.
pub async fn scan(
    State(state): State<AppState>,
    kiosk: KioskContext,
    Json(input): Json<ScanRequest>,
) -> AppResult<Json<ScanResponse>> {
    let directory = PgMemberDirectory::new(&state.pool);
    let resolution = resolve_scan(&directory, kiosk.organisation_id, &input.identifier).await?;
    check_in(&state, &kiosk, resolution).await.map(Json)
}

/// POST /api/v1/kiosk/scan-as
///
/// Check in a member picked from an ambiguous scan's candidate list.
pub async fn scan_as(
    State(state): State<AppState>,
    kiosk: KioskContext,
    Json(input): Json<ScanAsRequest>,
) -> AppResult<Json<ScanResponse>> {
    let directory = PgMemberDirectory::new(&state.pool);
    let resolution = resolve_member_id(&directory, kiosk.organisation_id, input.member_id).await?;
    check_in(&state, &kiosk, resolution).await.map(Json)
}

/// POST /api/v1/kiosk/checkout
///
/// Close a member session and split its minutes across the selected categories.
pub async fn checkout(
    State(state): State<AppState>,
    kiosk: KioskContext,
    Json(input): Json<CheckoutRequest>,
) -> AppResult<Json<CheckoutResponse>> {
    let end_time = required_end_time(input.end_time.as_deref())?;
    let category_ids: Vec<DbId> = input.tasks.iter().map(|t| t.category_id).collect();
    validate_selection(&category_ids)?;

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
    if found.is_visitor {
        return Err(Rejection::VisitorSession.into());
    }

    let window = checkout_window(
        found.session.start_time,
        end_time,
        Utc::now(),
        input.minutes,
        state.config.kiosk.checkout_tolerance_mins,
    )?;

    let offered: HashSet<DbId> =
        CategoryRepo::find_active_many(&state.pool, kiosk.organisation_id, &category_ids)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();

    let minutes = split_minutes(window.total_minutes, input.tasks.len());
    let mut allocations = Vec::with_capacity(input.tasks.len());
    for (task, minutes) in input.tasks.iter().zip(minutes) {
        if !offered.contains(&task.category_id) {
            return Err(CoreError::NotFound {
                entity: "Category",
                id: task.category_id,
            }
            .into());
        }
        allocations.push(NewAllocation {
            category_id: task.category_id,
            minutes,
            notes: clean_optional(task.notes.as_deref()),
        });
    }

    let close = CloseSession {
        end_time: window.end,
        duration_minutes: window.total_minutes,
        visitor_agency: None,
        visitor_purpose: None,
    };
    let (session, tasks) = AttendanceRepo::close(&state.pool, found.session.id, &close, &allocations)
        .await?
        .ok_or(Rejection::SessionNotOpen)?;

    tracing::info!(
        session_id = session.id,
        member_id = session.member_id,
        device_id = kiosk.device_id,
        total_minutes = window.total_minutes,
        categories = tasks.len(),
        "Member checked out",
    );

    Ok(Json(CheckoutResponse {
        status: "checked_out",
        session_id: session.id,
        total_minutes: window.total_minutes,
        allocations: tasks.into_iter().map(AllocationView::from).collect(),
    }))
}

/// GET /api/v1/kiosk/active
///
/// Open sessions at the device's station, newest first.
pub async fn active(
    State(state): State<AppState>,
    kiosk: KioskContext,
) -> AppResult<Json<Vec<ActiveSessionView>>> {
    let rows =
        AttendanceRepo::list_open_at_station(&state.pool, kiosk.organisation_id, kiosk.station_id)
            .await?;
    Ok(Json(rows.into_iter().map(ActiveSessionView::from).collect()))
}

/// GET /api/v1/kiosk/sessions/{id}
pub async fn session_detail(
    State(state): State<AppState>,
    kiosk: KioskContext,
    Path(id): Path<DbId>,
) -> AppResult<Json<SessionDetailView>> {
    let found =
        AttendanceRepo::find_scoped(&state.pool, kiosk.organisation_id, kiosk.station_id, id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Session",
                id,
            })?;
    let tasks = AttendanceRepo::tasks_for_session(&state.pool, id).await?;

    let s = found.session;
    Ok(Json(SessionDetailView {
        id: s.id,
        status: s.status,
        member_id: s.member_id,
        first_name: found.first_name,
        last_name: found.last_name,
        is_visitor: found.is_visitor,
        start_time: s.start_time,
        end_time: s.end_time,
        duration_minutes: s.duration_minutes,
        visitor_agency: s.visitor_agency,
        visitor_purpose: s.visitor_purpose,
        tasks: tasks.into_iter().map(AllocationView::from).collect(),
    }))
}

/// GET /api/v1/kiosk/categories
///
/// Active category tree. A top-level category without active children is
/// offered as its own only child so the picker always has a leaf to select.
pub async fn categories(
    State(state): State<AppState>,
    kiosk: KioskContext,
) -> AppResult<Json<Vec<KioskCategory>>> {
    let rows = CategoryRepo::list_active(&state.pool, kiosk.organisation_id).await?;

    let tree = build_tree(rows)
        .into_iter()
        .map(|node| {
            let parent = node.category;
            let children = if node.children.is_empty() {
                vec![KioskCategoryChild {
                    id: parent.id,
                    code: parent.code.clone(),
                    name: parent.name.clone(),
                }]
            } else {
                node.children
                    .into_iter()
                    .map(|c| KioskCategoryChild {
                        id: c.id,
                        code: c.code,
                        name: c.name,
                    })
                    .collect()
            };
            KioskCategory {
                id: parent.id,
                code: parent.code,
                name: parent.name,
                children,
            }
        })
        .collect();

    Ok(Json(tree))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Turn a resolution into a check-in outcome.
async fn check_in(
    state: &AppState,
    kiosk: &KioskContext,
    resolution: Resolution,
) -> AppResult<ScanResponse> {
    match resolution {
        Resolution::Unknown => {
            tracing::debug!(device_id = kiosk.device_id, "Scan matched no member");
            Ok(ScanResponse::Unknown)
        }
        Resolution::Disabled { member_id } => {
            tracing::info!(member_id, device_id = kiosk.device_id, "Disabled member scanned");
            Err(AppError::Core(CoreError::Disabled))
        }
        Resolution::Ambiguous(candidates) => {
            tracing::debug!(
                device_id = kiosk.device_id,
                candidates = candidates.len(),
                "Scan matched several members"
            );
            Ok(ScanResponse::Ambiguous { candidates })
        }
        Resolution::Resolved { member, matched_by } => {
            let input = NewSession {
                organisation_id: kiosk.organisation_id,
                station_id: kiosk.station_id,
                member_id: member.id,
                device_id: kiosk.device_id,
            };
            let outcome = AttendanceRepo::open(&state.pool, &input).await?;
            let view = |session_id, start_time| CheckInView {
                session_id,
                member_id: member.id,
                first_name: member.first_name.clone(),
                last_name: member.last_name.clone(),
                start_time,
                matched_by: matched_by.as_str(),
            };
            Ok(match outcome {
                OpenOutcome::Opened(session) => {
                    tracing::info!(
                        session_id = session.id,
                        member_id = member.id,
                        device_id = kiosk.device_id,
                        matched_by = matched_by.as_str(),
                        "Member checked in",
                    );
                    ScanResponse::CheckedIn(view(session.id, session.start_time))
                }
                OpenOutcome::AlreadyOpen(session) => {
                    ScanResponse::AlreadyIn(view(session.id, session.start_time))
                }
            })
        }
    }
}

/// Parse a required end time from a checkout body.
pub(crate) fn required_end_time(raw: Option<&str>) -> Result<Timestamp, Rejection> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(Rejection::MissingField("endTime"))?;
    parse_timestamp(raw)
}

/// Trim free text; blank becomes `None`.
pub(crate) fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn end_time_is_required_and_parsed() {
        assert_eq!(
            required_end_time(None),
            Err(Rejection::MissingField("endTime"))
        );
        assert_eq!(
            required_end_time(Some("  ")),
            Err(Rejection::MissingField("endTime"))
        );
        assert_eq!(
            required_end_time(Some("not a time")),
            Err(Rejection::MalformedTimestamp)
        );
        assert_matches!(required_end_time(Some("2025-06-01T10:00:00Z")), Ok(_));
    }

    #[test]
    fn optional_text_is_trimmed() {
        assert_eq!(clean_optional(Some("  SES ")), Some("SES".to_string()));
        assert_eq!(clean_optional(Some("   ")), None);
        assert_eq!(clean_optional(None), None);
    }

    #[test]
    fn scan_response_wire_shape() {
        let view = CheckInView {
            session_id: 5,
            member_id: 9,
            first_name: "Ada".into(),
            last_name: "Byron".into(),
            start_time: Utc::now(),
            matched_by: "tag",
        };
        let json = serde_json::to_value(ScanResponse::CheckedIn(view)).unwrap();
        assert_eq!(json["status"], "checked_in");
        assert_eq!(json["sessionId"], 5);
        assert_eq!(json["firstName"], "Ada");
        assert_eq!(json["matchedBy"], "tag");

        let unknown = serde_json::to_value(ScanResponse::Unknown).unwrap();
        assert_eq!(unknown, serde_json::json!({ "status": "unknown" }));
    }
}
