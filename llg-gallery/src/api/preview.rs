//! Preview media serving

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::services::preview::{content_type_for, preview_file};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub lora_name: String,
    pub filename: String,
}

/// GET /api/preview?lora_name=...&filename=...
///
/// Serves a preview file sibling to the named asset. The filename must be a
/// bare name; anything that could escape the asset's directory is refused.
pub async fn get_preview(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> ApiResult<Response> {
    if query.filename.contains("..")
        || query.filename.contains('/')
        || query.filename.contains('\\')
    {
        return Err(ApiError::Forbidden("Invalid preview filename".to_string()));
    }

    let path = preview_file(state.resolver.as_ref(), &query.lora_name, &query.filename)
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "Preview '{}' not found for '{}'",
                query.filename, query.lora_name
            ))
        })?;

    let bytes = tokio::fs::read(&path).await?;
    let content_type = content_type_for(&query.filename);

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

/// Build preview routes
pub fn preview_routes() -> Router<AppState> {
    Router::new().route("/api/preview", get(get_preview))
}
