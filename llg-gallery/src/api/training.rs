//! Embedded training metadata endpoint

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::services::safetensors::read_training_metadata;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct TrainingInfoRequest {
    pub lora_name: Option<String>,
}

/// POST /api/loras/training_info
///
/// Returns the `__metadata__` map embedded in a safetensors file header.
/// Non-safetensors formats get an informational message instead of an error.
pub async fn get_training_info(
    State(state): State<AppState>,
    Json(payload): Json<TrainingInfoRequest>,
) -> ApiResult<Json<Value>> {
    let lora_name = payload
        .lora_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing lora_name".to_string()))?;

    let path = state
        .resolver
        .resolve(&lora_name)
        .ok_or_else(|| ApiError::NotFound(format!("LoRA file not found: {}", lora_name)))?;

    let is_safetensors = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("safetensors"))
        .unwrap_or(false);
    if !is_safetensors {
        return Ok(Json(json!({
            "status": "ok",
            "metadata": { "Info": "Metadata reading is only supported for .safetensors files." }
        })));
    }

    let metadata = read_training_metadata(&path)
        .map_err(|e| ApiError::Internal(format!("Failed to read metadata: {}", e)))?;

    if metadata.is_empty() {
        return Ok(Json(json!({
            "status": "ok",
            "metadata": { "Info": "No metadata found in this file header." }
        })));
    }

    Ok(Json(json!({ "status": "ok", "metadata": metadata })))
}

/// Build training info routes
pub fn training_routes() -> Router<AppState> {
    Router::new().route("/api/loras/training_info", post(get_training_info))
}
