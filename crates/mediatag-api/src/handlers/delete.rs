use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use mediatag_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

/// 204 when both the object and the catalog row are gone, 502 otherwise.
#[tracing::instrument(skip(state), fields(operation = "delete"))]
pub async fn delete_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    if state.library.delete_asset(&key).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Storage(format!("Failed to fully delete {}", key)).into())
    }
}
