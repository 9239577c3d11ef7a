//! Admin handlers for activity categories (`/admin/categories`).
//!
//! Codes are auto-assigned from the slot scheme in
//! [`muster_core::category_code`] unless the admin supplies one. A code that
//! has been snapshotted by a checkout can no longer change.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use muster_core::category_code::{suggest_child_code, suggest_top_level_code, validate_code};
use muster_core::error::CoreError;
use muster_core::types::DbId;
use muster_db::models::category::{
    build_tree, CategoryChanges, CategoryUpdate, MoveDirection, NewCategory,
};
use muster_db::repositories::CategoryRepo;
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::admin::AdminContext;
use crate::middleware::rbac::RequireManager;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub parent_id: Option<DbId>,
    pub code: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub code: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct MoveCategoryRequest {
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl From<Direction> for MoveDirection {
    fn from(d: Direction) -> Self {
        match d {
            Direction::Up => MoveDirection::Up,
            Direction::Down => MoveDirection::Down,
        }
    }
}

/// GET /api/v1/admin/categories
///
/// Full tree, inactive categories included.
pub async fn list_categories(
    admin: AdminContext,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rows = CategoryRepo::list(&state.pool, admin.organisation_id).await?;
    Ok(Json(DataResponse {
        data: build_tree(rows),
    }))
}

/// POST /api/v1/admin/categories
pub async fn create_category(
    RequireManager(admin): RequireManager,
    State(state): State<AppState>,
    Json(input): Json<CreateCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let name = input.name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let parent = match input.parent_id {
        Some(parent_id) => {
            let parent = CategoryRepo::find_by_id(&state.pool, admin.organisation_id, parent_id)
                .await?
                .ok_or(category_not_found(parent_id))?;
            if parent.parent_id.is_some() {
                return Err(AppError::Core(CoreError::Validation(
                    "Categories can only be nested one level deep".into(),
                )));
            }
            Some(parent)
        }
        None => None,
    };

    let code = match input.code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        Some(code) => {
            validate_code(code)?;
            code.to_string()
        }
        None => {
            let used = CategoryRepo::codes(&state.pool, admin.organisation_id).await?;
            let suggested = match &parent {
                Some(parent) => suggest_child_code(&parent.code, &used),
                None => suggest_top_level_code(&used),
            };
            suggested.ok_or_else(|| {
                AppError::Core(CoreError::Conflict(
                    "No free category code left at this level".into(),
                ))
            })?
        }
    };

    let parent_id = parent.as_ref().map(|p| p.id);
    let sort = CategoryRepo::next_sort(&state.pool, admin.organisation_id, parent_id).await?;
    let category = CategoryRepo::create(
        &state.pool,
        &NewCategory {
            organisation_id: admin.organisation_id,
            parent_id,
            code,
            name: name.to_string(),
            sort,
        },
    )
    .await?;

    tracing::info!(
        category_id = category.id,
        code = %category.code,
        admin_id = admin.admin_id,
        "Category created",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

/// PUT /api/v1/admin/categories/{id}
pub async fn update_category(
    RequireManager(admin): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let code = input.code.as_deref().map(str::trim);
    if let Some(code) = code {
        validate_code(code)?;
    }
    let changes = CategoryChanges {
        name: input
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string),
        code: code.map(str::to_string),
        active: input.active,
    };

    let updated = match CategoryRepo::update(&state.pool, admin.organisation_id, id, &changes)
        .await?
    {
        CategoryUpdate::Updated(category) => category,
        CategoryUpdate::NotFound => return Err(category_not_found(id)),
        CategoryUpdate::CodeFrozen { code } => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "Code '{code}' is already recorded on checkouts and cannot change"
            ))))
        }
    };

    tracing::info!(category_id = id, admin_id = admin.admin_id, "Category updated");
    Ok(Json(DataResponse { data: updated }))
}

/// POST /api/v1/admin/categories/{id}/toggle
pub async fn toggle_category(
    RequireManager(admin): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let toggled = CategoryRepo::toggle(&state.pool, admin.organisation_id, id)
        .await?
        .ok_or(category_not_found(id))?;
    tracing::info!(category_id = id, active = toggled.active, "Category toggled");
    Ok(Json(DataResponse { data: toggled }))
}

/// POST /api/v1/admin/categories/{id}/move
pub async fn move_category(
    RequireManager(admin): RequireManager,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MoveCategoryRequest>,
) -> AppResult<impl IntoResponse> {
    let moved = CategoryRepo::move_category(
        &state.pool,
        admin.organisation_id,
        id,
        input.direction.into(),
    )
    .await?
    .ok_or(category_not_found(id))?;
    Ok(Json(DataResponse { data: moved }))
}

fn category_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Category",
        id,
    })
}
