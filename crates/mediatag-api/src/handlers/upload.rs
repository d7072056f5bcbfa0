use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use mediatag_core::AppError;

use crate::error::HttpAppError;
use crate::state::AppState;

fn multipart_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(format!("{}: {}", context, e.body_text()))
    } else {
        AppError::InvalidInput(format!("{}: {}", context, e.body_text()))
    }
}

/// Read the single `file` field of a multipart form.
async fn extract_multipart_file(mut multipart: Multipart) -> Result<(Vec<u8>, String), AppError> {
    let mut file: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to read multipart", e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        if file.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let filename = field
            .file_name()
            .map(|s| s.to_string())
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AppError::InvalidInput("File name is required".to_string()))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read file data", e))?;

        file = Some((data.to_vec(), filename));
    }

    file.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))
}

/// Store, tag and catalog one file. Responds once tagging has finished.
#[tracing::instrument(skip(state, multipart), fields(operation = "upload"))]
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let (data, filename) = extract_multipart_file(multipart).await?;

    if data.is_empty() {
        return Err(AppError::InvalidInput("File is empty".to_string()).into());
    }

    let asset = state.library.upload_bytes(&filename, data).await?;

    Ok((StatusCode::CREATED, Json(asset)))
}
