//! Admin handlers for the member roster (`/admin/members`).
//!
//! Reads are open to every admin role; writes need [`RequireManager`].
//! Members are never hard-deleted: `DELETE` archives.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use muster_core::error::CoreError;
use muster_core::member::{
    validate_member_number, validate_rfid_tag, validate_status, MEMBER_ACTIVE,
};
use muster_core::phone::normalize_au_mobile;
use muster_core::types::DbId;
use muster_db::models::member::{MemberChanges, MemberListParams, NewMember, TagChange};
use muster_db::repositories::MemberRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::admin::AdminContext;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateMemberRequest {
    pub member_number: String,
    #[validate(length(max = 100))]
    pub first_name: String,
    #[validate(length(max = 100))]
    pub last_name: String,
    pub mobile: Option<String>,
    pub status: Option<String>,
    #[validate(length(max = 64))]
    pub rfid_tag: Option<String>,
}

/// Partial update. Absent fields are left alone; an empty `mobile` clears the
/// number and an empty `rfid_tag` retires the member's tag.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMemberRequest {
    pub member_number: Option<String>,
    #[validate(length(max = 100))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    pub mobile: Option<String>,
    pub status: Option<String>,
    #[validate(length(max = 64))]
    pub rfid_tag: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/members
pub async fn list_members(
    admin: AdminContext,
    State(state): State<AppState>,
    Query(params): Query<MemberListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = params.status.as_deref() {
        validate_status(status)?;
    }
    let members = MemberRepo::list(&state.pool, admin.organisation_id, &params).await?;
    Ok(Json(DataResponse { data: members }))
}

/// GET /api/v1/admin/members/{id}
pub async fn get_member(
    admin: AdminContext,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let member = MemberRepo::find_with_tag(&state.pool, admin.organisation_id, id)
        .await?
        .ok_or(member_not_found(id))?;
    Ok(Json(DataResponse { data: member }))
}

/// POST /api/v1/admin/members
pub async fn create_member(
    RequireManager(admin): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CreateMemberRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let member_number = input.member_number.trim().to_string();
    validate_member_number(&member_number)?;
    let status = input
        .status
        .as_deref()
        .map(str::trim)
        .unwrap_or(MEMBER_ACTIVE)
        .to_string();
    validate_status(&status)?;
    let (mobile, mobile_normalized) = match parse_mobile(input.mobile.as_deref())? {
        Some((raw, normalized)) => (Some(raw), Some(normalized)),
        None => (None, None),
    };

    let new_member = NewMember {
        organisation_id: admin.organisation_id,
        member_number,
        first_name: required_text("first_name", &input.first_name)?,
        last_name: required_text("last_name", &input.last_name)?,
        mobile,
        mobile_normalized,
        status,
    };
    let tag = input
        .rfid_tag
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(tag) = tag {
        validate_rfid_tag(tag)?;
    }

    let member = MemberRepo::create(&state.pool, &new_member, tag).await?;
    tracing::info!(
        member_id = member.id,
        organisation_id = admin.organisation_id,
        admin_id = admin.admin_id,
        "Member created",
    );

    let created = MemberRepo::find_with_tag(&state.pool, admin.organisation_id, member.id)
        .await?
        .ok_or(member_not_found(member.id))?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// PUT /api/v1/admin/members/{id}
pub async fn update_member(
    RequireManager(admin): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateMemberRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let member_number = match input.member_number.as_deref().map(str::trim) {
        Some(number) => {
            validate_member_number(number)?;
            Some(number.to_string())
        }
        None => None,
    };
    let status = match input.status.as_deref().map(str::trim) {
        Some(status) => {
            validate_status(status)?;
            Some(status.to_string())
        }
        None => None,
    };
    let first_name = input
        .first_name
        .as_deref()
        .map(|v| required_text("first_name", v))
        .transpose()?;
    let last_name = input
        .last_name
        .as_deref()
        .map(|v| required_text("last_name", v))
        .transpose()?;
    let mobile = match input.mobile.as_deref() {
        Some(raw) => Some(parse_mobile(Some(raw))?),
        None => None,
    };

    let changes = MemberChanges {
        member_number,
        first_name,
        last_name,
        mobile,
        status,
    };
    let tag = match input.rfid_tag.as_deref().map(str::trim) {
        None => TagChange::Keep,
        Some("") => TagChange::Clear,
        Some(value) => {
            validate_rfid_tag(value)?;
            TagChange::Assign(value.to_string())
        }
    };

    MemberRepo::update(&state.pool, admin.organisation_id, id, &changes, &tag)
        .await?
        .ok_or(member_not_found(id))?;
    tracing::info!(member_id = id, admin_id = admin.admin_id, "Member updated");

    let updated = MemberRepo::find_with_tag(&state.pool, admin.organisation_id, id)
        .await?
        .ok_or(member_not_found(id))?;
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/admin/members/{id}
///
/// Archives the member. Archiving an already archived member is a no-op.
pub async fn archive_member(
    RequireManager(admin): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let archived = MemberRepo::archive(&state.pool, admin.organisation_id, id).await?;
    if !archived
        && MemberRepo::find_by_id(&state.pool, admin.organisation_id, id)
            .await?
            .is_none()
    {
        return Err(member_not_found(id));
    }
    if archived {
        tracing::info!(member_id = id, admin_id = admin.admin_id, "Member archived");
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn member_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Member",
        id,
    })
}

/// Trimmed non-empty text, or a validation error naming `field`.
fn required_text(field: &str, value: &str) -> Result<String, CoreError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Blank input means no mobile. Anything else must normalize to an
/// Australian mobile; returns `(as_entered, normalized)`.
fn parse_mobile(raw: Option<&str>) -> Result<Option<(String, String)>, CoreError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let normalized = normalize_au_mobile(raw)
        .ok_or_else(|| CoreError::Validation(format!("Invalid mobile number '{raw}'")))?;
    Ok(Some((raw.to_string(), normalized)))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn blank_mobile_is_none() {
        assert_matches!(parse_mobile(None), Ok(None));
        assert_matches!(parse_mobile(Some("   ")), Ok(None));
    }

    #[test]
    fn mobile_is_normalized() {
        let parsed = parse_mobile(Some("+61 412 345 678")).unwrap();
        assert_eq!(
            parsed,
            Some(("+61 412 345 678".to_string(), "0412345678".to_string()))
        );
    }

    #[test]
    fn invalid_mobile_is_rejected() {
        assert_matches!(parse_mobile(Some("12345")), Err(CoreError::Validation(_)));
    }

    #[test]
    fn required_text_trims_and_rejects_blank() {
        assert_eq!(required_text("first_name", "  Ada ").unwrap(), "Ada");
        assert_matches!(
            required_text("first_name", "  "),
            Err(CoreError::Validation(msg)) if msg.contains("first_name")
        );
    }
}
