//! Request extractors resolving who is calling.
//!
//! - [`kiosk::KioskContext`] -- A registered kiosk device, from its bearer device key.
//! - [`admin::AdminContext`] -- An admin user, from a JWT Bearer token.
//! - [`rbac::RequireManager`] -- An admin allowed to change data (`owner` or `admin`).

pub mod admin;
pub mod kiosk;
pub mod rbac;

use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

/// The trimmed credential of an `Authorization: Bearer` header, if any.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
