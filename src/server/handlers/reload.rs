//! Shared reload handling.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::super::types::{AppState, ReloadErrorResponse, ReloadResponse};
use crate::config::RELOAD_FAILED_MESSAGE;
use crate::geoip::DatabaseKind;

/// Reloads `kind` from its configured file.
///
/// Opening reads the whole file, so it runs on the blocking pool.
pub(super) async fn reload(state: AppState, kind: DatabaseKind) -> Response {
    let path = state.path(kind).to_path_buf();
    let service = state.service.clone();

    let result = tokio::task::spawn_blocking(move || service.reload(kind, &path)).await;

    let error = match result {
        Ok(Ok(outcome)) => {
            return (
                StatusCode::OK,
                Json(ReloadResponse {
                    message: format!("{} database reloaded successfully", kind),
                    generation: outcome.generation,
                }),
            )
                .into_response();
        }
        Ok(Err(e)) => e.to_string(),
        Err(e) => {
            log::error!("{} reload task failed: {}", kind, e);
            format!("reload task failed: {}", e)
        }
    };

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ReloadErrorResponse {
            error,
            message: RELOAD_FAILED_MESSAGE,
        }),
    )
        .into_response()
}
