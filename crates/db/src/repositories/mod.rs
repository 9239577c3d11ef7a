//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Every lookup that a kiosk or an
//! admin can reach is scoped by `organisation_id`.

pub mod admin_repo;
pub mod attendance_repo;
pub mod category_repo;
pub mod dashboard_repo;
pub mod device_repo;
pub mod invite_repo;
pub mod member_repo;
pub mod organisation_repo;

pub use admin_repo::{AdminSessionRepo, AdminUserRepo};
pub use attendance_repo::AttendanceRepo;
pub use category_repo::CategoryRepo;
pub use dashboard_repo::DashboardRepo;
pub use device_repo::DeviceRepo;
pub use invite_repo::InviteRepo;
pub use member_repo::MemberRepo;
pub use organisation_repo::{OrganisationRepo, StationRepo};
