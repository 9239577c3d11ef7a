//! Admin payloads are wrapped as `{ "data": ... }`. Kiosk payloads are
//! sent bare.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
