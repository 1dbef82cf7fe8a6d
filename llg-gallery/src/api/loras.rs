//! Listing, tag census and metadata update endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::Query;
use serde::Deserialize;
use serde_json::{json, Value};

use llg_common::json::JsonDoc;

use crate::models::{FilterSpec, ListingPage, PageRequest, TagMode};
use crate::services::listing::list_loras;
use crate::{ApiError, ApiResult, AppState};

/// Sidecar fields a metadata update may carry
const RECOGNIZED_FIELDS: &[&str] = &[
    "tags",
    "activation text",
    "download_url",
    "preferred weight",
    "negative text",
    "notes",
    "sd version",
];

/// Query parameters for the listing endpoint
///
/// `selected_loras` repeats once per pinned asset; `filter_tag` is a
/// comma-separated tag list.
#[derive(Debug, Deserialize)]
pub struct LoraQuery {
    #[serde(default)]
    pub name_filter: String,
    #[serde(default)]
    pub filter_tag: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub selected_loras: Vec<String>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn default_mode() -> String {
    "OR".to_string()
}

fn default_page() -> usize {
    1
}

fn default_per_page() -> usize {
    50
}

/// GET /api/loras
///
/// Paginated, filtered, pin-aware listing of known LoRAs plus the distinct
/// folder list for the folder picker.
pub async fn get_loras(
    State(state): State<AppState>,
    Query(query): Query<LoraQuery>,
) -> ApiResult<Json<ListingPage>> {
    let tags: Vec<String> = query
        .filter_tag
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let folder = {
        let folder = query.folder.trim();
        (!folder.is_empty()).then(|| folder.to_string())
    };

    let filter = FilterSpec {
        name: query.name_filter.trim().to_string(),
        tags,
        mode: TagMode::parse(&query.mode),
        folder,
        pinned: query.selected_loras,
    };
    let page = PageRequest {
        page: query.page,
        per_page: query.per_page,
    };

    let listing = list_loras(state.resolver.as_ref(), &state.sidecars, &filter, page)?;
    Ok(Json(listing))
}

/// GET /api/loras/tags
///
/// Distinct tag census across every sidecar document.
pub async fn get_all_tags(State(state): State<AppState>) -> Json<Value> {
    Json(json!({ "tags": state.sidecars.all_tags() }))
}

/// Request payload for a metadata update
#[derive(Debug, Deserialize)]
pub struct UpdateMetadataRequest {
    pub lora_name: Option<String>,
    /// Recognized sidecar fields, passed through as-is
    #[serde(flatten)]
    pub fields: JsonDoc,
}

/// POST /api/loras/metadata
///
/// Merges the recognized fields of the payload into the asset's sidecar
/// document. Unrecognized payload keys are ignored; normalization (tag
/// trimming, weight coercion) happens in the store.
pub async fn update_metadata(
    State(state): State<AppState>,
    Json(payload): Json<UpdateMetadataRequest>,
) -> ApiResult<Json<Value>> {
    let lora_name = payload
        .lora_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing lora_name".to_string()))?;

    let mut update = JsonDoc::new();
    for field in RECOGNIZED_FIELDS {
        if let Some(value) = payload.fields.get(*field) {
            if !value.is_null() {
                update.insert(field.to_string(), value.clone());
            }
        }
    }

    state.sidecars.write(&lora_name, update, true)?;
    Ok(Json(json!({ "status": "ok" })))
}

/// Build listing and metadata routes
pub fn lora_routes() -> Router<AppState> {
    Router::new()
        .route("/api/loras", get(get_loras))
        .route("/api/loras/tags", get(get_all_tags))
        .route("/api/loras/metadata", post(update_metadata))
}
