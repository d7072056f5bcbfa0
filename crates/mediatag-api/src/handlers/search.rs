use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use mediatag_core::{AppError, MediaAsset};
use serde::{Deserialize, Serialize};

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    /// Keywords the query was expanded into, when expansion is on
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    pub results: Vec<MediaAsset>,
    pub count: usize,
}

/// Substring search over tags and original names, widened by keyword expansion if configured
#[tracing::instrument(skip(state), fields(operation = "search"))]
pub async fn search_files(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let query = params.q.trim().to_string();
    if query.is_empty() {
        return Err(AppError::InvalidInput("Query parameter 'q' is required".to_string()).into());
    }

    let found = state.library.search_catalog_detailed(&query).await?;
    let count = found.assets.len();

    Ok(Json(SearchResponse {
        query,
        keywords: found.keywords,
        results: found.assets,
        count,
    }))
}
