//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{categories, dashboard, kiosks, members, stations};
use crate::state::AppState;

/// Routes mounted at `/admin`. All require an admin JWT; writes require the
/// `owner` or `admin` role.
///
/// ```text
/// GET         /dashboard                  -> get_dashboard
///
/// GET, POST   /members                    -> list_members, create_member
/// GET, PUT,
///   DELETE    /members/{id}               -> get_member, update_member, archive_member
///
/// GET, POST   /categories                 -> list_categories, create_category
/// PUT         /categories/{id}            -> update_category
/// POST        /categories/{id}/toggle     -> toggle_category
/// POST        /categories/{id}/move       -> move_category
///
/// GET, POST   /stations                   -> list_stations, create_station
///
/// GET         /kiosks/devices             -> list_devices
/// PUT, DELETE /kiosks/devices/{id}        -> rename_device, deactivate_device
/// GET, POST   /kiosks/invites             -> list_invites, create_invite
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard::get_dashboard))
        .route(
            "/members",
            get(members::list_members).post(members::create_member),
        )
        .route(
            "/members/{id}",
            get(members::get_member)
                .put(members::update_member)
                .delete(members::archive_member),
        )
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/categories/{id}", put(categories::update_category))
        .route("/categories/{id}/toggle", post(categories::toggle_category))
        .route("/categories/{id}/move", post(categories::move_category))
        .route(
            "/stations",
            get(stations::list_stations).post(stations::create_station),
        )
        .route("/kiosks/devices", get(kiosks::list_devices))
        .route(
            "/kiosks/devices/{id}",
            put(kiosks::rename_device).delete(kiosks::deactivate_device),
        )
        .route(
            "/kiosks/invites",
            get(kiosks::list_invites).post(kiosks::create_invite),
        )
}
