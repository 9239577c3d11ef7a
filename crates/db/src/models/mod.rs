//! Row structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` create / update DTOs where the admin API writes the table

pub mod admin;
pub mod attendance;
pub mod category;
pub mod dashboard;
pub mod device;
pub mod member;
pub mod organisation;
