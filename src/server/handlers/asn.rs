//! ASN handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::super::types::AppState;
use super::error_response;
use super::reload::reload;
use crate::geoip::DatabaseKind;

/// `GET /asn/:ip`
pub async fn asn_handler(State(state): State<AppState>, Path(ip): Path<String>) -> Response {
    match state.service.resolve_as(&ip) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => error_response(&e),
    }
}

/// `GET /asn/reload`
pub async fn asn_reload_handler(State(state): State<AppState>) -> Response {
    reload(state, DatabaseKind::Asn).await
}
