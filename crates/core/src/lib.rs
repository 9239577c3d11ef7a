//! Domain logic for the Muster station check-in service.
//!
//! Everything in this crate is free of I/O. Storage is reached through the
//! [`scan::MemberLookup`] trait, implemented by `muster-db`.

pub mod allocation;
pub mod attendance;
pub mod category_code;
pub mod error;
pub mod hashing;
pub mod kiosk;
pub mod member;
pub mod phone;
pub mod roles;
pub mod scan;
pub mod types;
