pub mod admin;
pub mod auth;
pub mod health;
pub mod kiosk;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login                           login (public)
/// /auth/refresh                         refresh (public)
/// /auth/logout                          logout (requires admin auth)
///
/// /kiosk/register                       trade invite passphrase for device key (public)
/// /kiosk/scan, /kiosk/scan-as           member check-in (device key)
/// /kiosk/checkout                       member check-out with task allocation
/// /kiosk/active                         open sessions at the device's station
/// /kiosk/sessions/{id}                  session detail
/// /kiosk/categories                     active category tree
/// /kiosk/visitor/checkin                visitor check-in
/// /kiosk/visitor/checkout               visitor check-out
///
/// /admin/dashboard                      headline counts
/// /admin/members[/{id}]                 roster (archive on delete)
/// /admin/categories[/{id}[/toggle|/move]]
/// /admin/stations
/// /admin/kiosks/devices[/{id}]
/// /admin/kiosks/invites
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/kiosk", kiosk::router())
        .nest("/admin", admin::router())
}
