//! JSON status handler.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::super::types::AppState;

/// `GET /status`: the handle currently serving each database
pub async fn status_handler(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(state.service.status())).into_response()
}
