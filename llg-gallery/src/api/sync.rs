//! Remote catalog sync endpoint

use std::path::PathBuf;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use llg_common::json::JsonDoc;

use crate::services::catalog::preview_download_url;
use crate::services::hasher::sha256_file;
use crate::services::preview::resolve_preview;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    pub lora_name: Option<String>,
    /// Download preview media next to the model file
    #[serde(default = "default_true")]
    pub sync_image: bool,
    /// Write trained words and model page URL into the sidecar
    #[serde(default = "default_true")]
    pub sync_meta: bool,
}

fn default_true() -> bool {
    true
}

/// POST /api/loras/sync
///
/// Fetches catalog metadata for an asset by content digest. The digest is
/// taken from the sidecar's `hash` key, computed (and cached there) on first
/// use. Preview download failures degrade to a metadata-only sync.
pub async fn sync_lora(
    State(state): State<AppState>,
    Json(payload): Json<SyncRequest>,
) -> ApiResult<Json<Value>> {
    let lora_name = payload
        .lora_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Missing lora_name".to_string()))?;

    let lora_path = state
        .resolver
        .resolve(&lora_name)
        .ok_or_else(|| ApiError::NotFound(format!("LoRA file not found: {}", lora_name)))?;

    // Lazily computed content digest, cached in the sidecar.
    let doc = state.sidecars.read(&lora_name);
    let digest = match doc.get("hash").and_then(Value::as_str) {
        Some(digest) => digest.to_string(),
        None => {
            tracing::info!("Calculating hash for {}...", lora_name);
            let path = lora_path.clone();
            let digest = tokio::task::spawn_blocking(move || sha256_file(&path))
                .await
                .map_err(|e| ApiError::Internal(e.to_string()))?
                .map_err(|e| ApiError::Internal(format!("Failed to calculate hash: {}", e)))?;

            let mut update = JsonDoc::new();
            update.insert("hash".to_string(), json!(digest));
            state.sidecars.write(&lora_name, update, true)?;
            digest
        }
    };

    let version = state.catalog.version_by_hash(&digest).await?;

    if payload.sync_image {
        match version.images.iter().find(|m| !m.is_video()).or_else(|| version.images.first()) {
            Some(media) => {
                let (download_url, ext) = preview_download_url(media);
                let base = lora_path.with_extension("");
                let dest = PathBuf::from(format!("{}{}", base.display(), ext));

                if let Err(e) = state.catalog.download(&download_url, &dest).await {
                    tracing::warn!("Preview download for '{}' failed: {}", lora_name, e);
                }
            }
            None => tracing::info!("No preview media on the catalog for '{}'", lora_name),
        }
    }

    let mut new_meta = JsonDoc::new();
    if payload.sync_meta {
        if !version.trained_words.is_empty() {
            new_meta.insert(
                "activation text".to_string(),
                json!(version.trained_words.join(", ")),
            );
        }
        if let Some(model_id) = version.model_id {
            new_meta.insert(
                "download_url".to_string(),
                json!(state.catalog.model_page_url(model_id)),
            );
        }
        if !new_meta.is_empty() {
            state.sidecars.write(&lora_name, new_meta.clone(), true)?;
        }
    }

    let (preview_url, preview_type) = resolve_preview(state.resolver.as_ref(), &lora_name);

    let mut metadata = new_meta;
    metadata.insert("preview_url".to_string(), json!(preview_url));
    metadata.insert("preview_type".to_string(), json!(preview_type));

    Ok(Json(json!({ "status": "ok", "metadata": metadata })))
}

/// Build catalog sync routes
pub fn sync_routes() -> Router<AppState> {
    Router::new().route("/api/loras/sync", post(sync_lora))
}
