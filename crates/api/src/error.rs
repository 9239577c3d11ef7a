//! HTTP rendering of errors.
//!
//! Every error body is `{ "error": message, "code": CODE }`. Input rejections
//! also carry a stable `reason` the kiosk can switch on.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use muster_core::error::{CoreError, Rejection};
use serde_json::json;

/// Error type returned by every handler and extractor.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        AppError::Core(CoreError::Rejected(rejection))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

/// What a response says about an error.
struct ErrorBody {
    status: StatusCode,
    code: &'static str,
    message: String,
    reason: Option<&'static str>,
}

impl ErrorBody {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            reason: None,
        }
    }

    /// A 500 whose detail goes to the log, not the client.
    fn internal(detail: &dyn std::fmt::Display) -> Self {
        tracing::error!(error = %detail, "Request failed with an internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "An internal error occurred",
        )
    }
}

impl AppError {
    fn body(&self) -> ErrorBody {
        match self {
            AppError::Core(core) => core_body(core),
            AppError::Database(err) => database_body(err),
            AppError::BadRequest(msg) => {
                ErrorBody::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone())
            }
            AppError::InternalError(msg) => ErrorBody::internal(msg),
        }
    }
}

fn core_body(err: &CoreError) -> ErrorBody {
    match err {
        CoreError::NotFound { entity, id } => ErrorBody::new(
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => {
            ErrorBody::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone())
        }
        CoreError::Rejected(rejection) => ErrorBody {
            reason: Some(rejection.reason()),
            ..ErrorBody::new(StatusCode::BAD_REQUEST, "INVALID_INPUT", rejection.to_string())
        },
        CoreError::Conflict(msg) => ErrorBody::new(StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => {
            ErrorBody::new(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
        }
        CoreError::Forbidden(msg) => ErrorBody::new(StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Disabled => ErrorBody::new(StatusCode::FORBIDDEN, "DISABLED", err.to_string()),
        CoreError::Internal(msg) => ErrorBody::internal(msg),
    }
}

/// `RowNotFound` is a 404 and a unique violation on a `uq_*` constraint is a
/// 409. Anything else is logged and hidden behind a 500.
fn database_body(err: &sqlx::Error) -> ErrorBody {
    match err {
        sqlx::Error::RowNotFound => {
            ErrorBody::new(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found")
        }
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            match db_err.constraint().filter(|c| c.starts_with("uq_")) {
                Some(constraint) => ErrorBody::new(
                    StatusCode::CONFLICT,
                    "CONFLICT",
                    format!("Duplicate value violates unique constraint: {constraint}"),
                ),
                None => ErrorBody::internal(db_err),
            }
        }
        other => ErrorBody::internal(other),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = self.body();
        let mut json = json!({
            "error": body.message,
            "code": body.code,
        });
        if let Some(reason) = body.reason {
            json["reason"] = reason.into();
        }
        (body.status, axum::Json(json)).into_response()
    }
}
