use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use mediatag_core::{AppError, MediaAsset};
use serde::Serialize;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct FileListResponse {
    pub files: Vec<MediaAsset>,
    pub count: usize,
}

#[tracing::instrument(skip(state), fields(operation = "list"))]
pub async fn list_files(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, HttpAppError> {
    let files = state.library.list_catalog().await?;
    let count = files.len();
    Ok(Json(FileListResponse { files, count }))
}

#[tracing::instrument(skip(state), fields(operation = "get"))]
pub async fn get_file(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let asset = state
        .library
        .get_asset(&key)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No file with key {}", key)))?;

    Ok(Json(asset))
}
