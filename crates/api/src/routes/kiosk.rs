//! Route definitions for the kiosk surface.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{kiosk, registration, visitor};
use crate::state::AppState;

/// Routes mounted at `/kiosk`.
///
/// Everything except `/register` requires a device key.
///
/// ```text
/// POST /register           -> register (public)
/// POST /scan               -> scan
/// POST /scan-as            -> scan_as
/// POST /checkout           -> checkout
/// GET  /active             -> active
/// GET  /sessions/{id}      -> session_detail
/// GET  /categories         -> categories
/// POST /visitor/checkin    -> visitor::checkin
/// POST /visitor/checkout   -> visitor::checkout
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(registration::register))
        .route("/scan", post(kiosk::scan))
        .route("/scan-as", post(kiosk::scan_as))
        .route("/checkout", post(kiosk::checkout))
        .route("/active", get(kiosk::active))
        .route("/sessions/{id}", get(kiosk::session_detail))
        .route("/categories", get(kiosk::categories))
        .route("/visitor/checkin", post(visitor::checkin))
        .route("/visitor/checkout", post(visitor::checkout))
}
