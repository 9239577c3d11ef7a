//! Well-known admin role name constants.
//!
//! These must match the `admin_users.role` CHECK constraint.

pub const ROLE_OWNER: &str = "owner";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STAFF: &str = "staff";

/// All valid admin role values.
pub const VALID_ROLES: &[&str] = &[ROLE_OWNER, ROLE_ADMIN, ROLE_STAFF];

/// Whether a role may change members, categories, stations and kiosks.
/// Staff accounts are read-only.
pub fn can_manage(role: &str) -> bool {
    role == ROLE_OWNER || role == ROLE_ADMIN
}
