//! Named selection preset endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{ApiError, ApiResult, AppState};

/// GET /api/presets
pub async fn get_presets(State(state): State<AppState>) -> Json<Value> {
    Json(Value::Object(state.docs.presets()))
}

#[derive(Debug, Deserialize)]
pub struct SavePresetRequest {
    pub name: Option<String>,
    pub data: Option<Value>,
}

/// POST /api/presets/save
pub async fn save_preset(
    State(state): State<AppState>,
    Json(payload): Json<SavePresetRequest>,
) -> ApiResult<Json<Value>> {
    let name = payload
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing preset name".to_string()))?;
    let data = payload
        .data
        .filter(|data| !data.is_null())
        .ok_or_else(|| ApiError::BadRequest("Missing preset data".to_string()))?;

    let presets = state.docs.save_preset(&name, data)?;
    Ok(Json(json!({ "status": "ok", "presets": presets })))
}

#[derive(Debug, Deserialize)]
pub struct DeletePresetRequest {
    pub name: Option<String>,
}

/// POST /api/presets/delete
///
/// Deleting an unknown preset succeeds and returns the unchanged set.
pub async fn delete_preset(
    State(state): State<AppState>,
    Json(payload): Json<DeletePresetRequest>,
) -> ApiResult<Json<Value>> {
    let name = payload
        .name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing preset name".to_string()))?;

    let presets = state.docs.delete_preset(&name)?;
    Ok(Json(json!({ "status": "ok", "presets": presets })))
}

/// Build preset routes
pub fn preset_routes() -> Router<AppState> {
    Router::new()
        .route("/api/presets", get(get_presets))
        .route("/api/presets/save", post(save_preset))
        .route("/api/presets/delete", post(delete_preset))
}
