//! HTTP surface of muster: kiosk check-in endpoints under `/api/v1/kiosk`
//! and the organisation admin API under `/api/v1/admin`.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
