use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A kiosk request rejected for a specific, client-actionable reason.
    #[error("Invalid input: {0}")]
    Rejected(#[from] Rejection),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The member exists but is not allowed to check in.
    #[error("Member is disabled")]
    Disabled,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Reasons a check-in or checkout request is refused.
///
/// Each reason carries a stable snake_case code (see [`Rejection::reason`])
/// that the kiosk client switches on to decide whether to re-prompt the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("timestamp is not a valid RFC 3339 date-time")]
    MalformedTimestamp,

    #[error("end time is before the session start")]
    EndBeforeStart,

    #[error("end time is too far in the future")]
    EndTooFarAhead,

    #[error("at least one task category is required")]
    EmptyTasks,

    #[error("a category was selected more than once")]
    DuplicateCategory,

    #[error("claimed minutes must not be negative")]
    NegativeMinutes,

    #[error("claimed minutes exceed the elapsed session time")]
    MinutesExceedElapsed,

    #[error("session is not open")]
    SessionNotOpen,

    #[error("visitor sessions must be closed through visitor checkout")]
    VisitorSession,

    #[error("session does not belong to a visitor")]
    NotVisitorSession,

    #[error("a required field is missing: {0}")]
    MissingField(&'static str),
}

impl Rejection {
    /// Stable machine-readable code for this rejection.
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::MalformedTimestamp => "malformed_timestamp",
            Rejection::EndBeforeStart => "end_before_start",
            Rejection::EndTooFarAhead => "end_too_far_ahead",
            Rejection::EmptyTasks => "empty_tasks",
            Rejection::DuplicateCategory => "duplicate_category",
            Rejection::NegativeMinutes => "negative_minutes",
            Rejection::MinutesExceedElapsed => "minutes_exceed_elapsed",
            Rejection::SessionNotOpen => "session_not_open",
            Rejection::VisitorSession => "visitor_session",
            Rejection::NotVisitorSession => "not_visitor_session",
            Rejection::MissingField(_) => "missing_field",
        }
    }
}
