//! UI collapse-state persistence endpoints

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use llg_common::json::JsonDoc;

use crate::services::docs::DocStore;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct UiStateQuery {
    pub node_id: Option<String>,
    pub gallery_id: Option<String>,
}

/// GET /api/ui_state?node_id=...&gallery_id=...
pub async fn get_ui_state(
    State(state): State<AppState>,
    Query(query): Query<UiStateQuery>,
) -> ApiResult<Json<Value>> {
    let (Some(node_id), Some(gallery_id)) = (query.node_id, query.gallery_id) else {
        return Err(ApiError::BadRequest(
            "node_id and gallery_id are required".to_string(),
        ));
    };

    let key = DocStore::ui_state_key(&gallery_id, &node_id);
    Ok(Json(state.docs.get_ui_state(&key)))
}

#[derive(Debug, Deserialize)]
pub struct SetUiStateRequest {
    /// Host node id; numbers and strings both occur in the wild
    pub node_id: Option<Value>,
    pub gallery_id: Option<String>,
    #[serde(default)]
    pub state: JsonDoc,
}

/// POST /api/ui_state
///
/// Shallow-merges the payload's `state` object into the widget's stored
/// state.
pub async fn set_ui_state(
    State(state): State<AppState>,
    Json(payload): Json<SetUiStateRequest>,
) -> ApiResult<Json<Value>> {
    let gallery_id = payload
        .gallery_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing gallery_id".to_string()))?;

    let node_id = match payload.node_id {
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => "null".to_string(),
    };

    let key = DocStore::ui_state_key(&gallery_id, &node_id);
    state.docs.set_ui_state(&key, payload.state)?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Build UI state routes
pub fn ui_state_routes() -> Router<AppState> {
    Router::new().route("/api/ui_state", get(get_ui_state).post(set_ui_state))
}
