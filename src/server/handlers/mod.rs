//! HTTP handlers.

mod asn;
mod geo;
mod ipinfo;
mod reload;
mod status;

pub use asn::{asn_handler, asn_reload_handler};
pub use geo::{geo_handler, geo_reload_handler};
pub use ipinfo::ipinfo_handler;
pub use status::status_handler;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::types::ErrorResponse;
use crate::error_handling::LookupError;

/// Every lookup failure, including invalid input, is reported as a 500
fn error_response(error: &LookupError) -> Response {
    log::debug!("Lookup failed: {}", error);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}
