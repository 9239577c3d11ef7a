//! Admin authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT access-token generation, validation, and refresh-token helpers.
//!
//! Kiosk devices do not use these; they authenticate with a bearer device
//! key (see [`crate::middleware::kiosk`]).

pub mod jwt;
pub mod password;
