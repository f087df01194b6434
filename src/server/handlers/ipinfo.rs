//! Combined AS and location handler.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::super::types::AppState;
use super::error_response;

/// `GET /ipinfo/:ip`
///
/// Fails only when the location lookup fails; see
/// [`LookupService::resolve_combined`](crate::geoip::LookupService::resolve_combined).
pub async fn ipinfo_handler(State(state): State<AppState>, Path(ip): Path<String>) -> Response {
    match state.service.resolve_combined(&ip) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => error_response(&e),
    }
}
