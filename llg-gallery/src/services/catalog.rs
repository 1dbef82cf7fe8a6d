//! Remote model catalog client
//!
//! Looks up descriptive metadata and preview media by content digest and
//! downloads preview files next to the model. Preview URLs are rewritten to
//! request a 450-px transcode instead of the original upload; videos are
//! requested as webm.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::preview::IMAGE_EXTENSIONS;

const DEFAULT_BASE_URL: &str = "https://civitai.com";
const USER_AGENT: &str = concat!("llg-gallery/", env!("CARGO_PKG_VERSION"));

/// Catalog client errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("No catalog entry for hash {0}")]
    NotFound(String),

    #[error("Catalog API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Preview download failed: {0}")]
    Download(String),
}

/// Catalog model-version record (the subset this service consumes)
#[derive(Debug, Clone, Deserialize)]
pub struct ModelVersion {
    /// Owning model id, used to build the model page URL
    #[serde(rename = "modelId")]
    pub model_id: Option<i64>,
    /// Trigger words the model was trained with
    #[serde(rename = "trainedWords", default)]
    pub trained_words: Vec<String>,
    /// Preview media, mixed images and videos
    #[serde(default)]
    pub images: Vec<CatalogMedia>,
}

/// One preview media item from the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogMedia {
    pub url: String,
    /// "image" or "video"
    #[serde(rename = "type", default)]
    pub media_type: String,
}

impl CatalogMedia {
    pub fn is_video(&self) -> bool {
        self.media_type == "video"
    }
}

/// Remote catalog API client
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a client; `base_url` overrides the public catalog (tests).
    pub fn new(base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        }
    }

    /// Look up a model version by SHA-256 content digest.
    pub async fn version_by_hash(&self, digest: &str) -> Result<ModelVersion, CatalogError> {
        let url = format!("{}/api/v1/model-versions/by-hash/{}", self.base_url, digest);
        tracing::debug!("Catalog lookup: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(CatalogError::NotFound(digest.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), body));
        }

        response
            .json::<ModelVersion>()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))
    }

    /// Download a media file to `dest` (whole-body read; previews are small).
    pub async fn download(&self, url: &str, dest: &Path) -> Result<(), CatalogError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CatalogError::Download(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Download(e.to_string()))?;
        std::fs::write(dest, &bytes).map_err(|e| CatalogError::Download(e.to_string()))?;
        Ok(())
    }

    /// Human-facing model page URL for the `download_url` sidecar key.
    pub fn model_page_url(&self, model_id: i64) -> String {
        format!("{}/models/{}", self.base_url, model_id)
    }
}

/// Rewrite a catalog media URL for download and pick the file extension.
///
/// Videos are requested as a 450-px webm transcode; images as a 450-px
/// resize, keeping their own extension when it is a recognized image type.
/// Unparsable URLs fall back to the original with a guessed extension.
pub fn preview_download_url(media: &CatalogMedia) -> (String, String) {
    if media.is_video() {
        (rewrite_video_url(&media.url), ".webm".to_string())
    } else {
        rewrite_image_url(&media.url)
    }
}

fn rewrite_video_url(url: &str) -> String {
    if url.contains("/original=true/") {
        let transcoded = url.replace("/original=true/", "/transcode=true,width=450,optimized=true/");
        return format!("{}.webm", strip_extension(&transcoded));
    }

    match reqwest::Url::parse(url) {
        Ok(parsed) => {
            let mut segments: Vec<String> = parsed
                .path_segments()
                .map(|s| s.map(str::to_string).collect())
                .unwrap_or_default();
            if let Some(filename) = segments.pop() {
                let base = strip_extension(&filename);
                segments.push("transcode=true,width=450,optimized=true".to_string());
                segments.push(format!("{}.webm", base));
            }
            let mut rewritten = parsed.clone();
            rewritten.set_path(&segments.join("/"));
            rewritten.to_string()
        }
        Err(_) => url.to_string(),
    }
}

fn rewrite_image_url(url: &str) -> (String, String) {
    let rewritten = if url.contains("/original=true/") {
        url.replace("/original=true/", "/width=450/")
    } else {
        match reqwest::Url::parse(url) {
            Ok(parsed) => {
                let mut segments: Vec<String> = parsed
                    .path_segments()
                    .map(|s| s.map(str::to_string).collect())
                    .unwrap_or_default();
                if let Some(pos) = segments.iter().position(|s| s.starts_with("width=")) {
                    segments[pos] = "width=450".to_string();
                } else if !segments.is_empty() {
                    segments.insert(segments.len() - 1, "width=450".to_string());
                }
                let mut rewritten = parsed.clone();
                rewritten.set_path(&segments.join("/"));
                rewritten.to_string()
            }
            Err(_) => return (url.to_string(), ".png".to_string()),
        }
    };

    let ext = extension_of(&rewritten)
        .filter(|e| IMAGE_EXTENSIONS.contains(&e.as_str()))
        .map(|e| format!(".{}", e))
        .unwrap_or_else(|| ".png".to_string());

    (rewritten, ext)
}

fn strip_extension(s: &str) -> &str {
    match s.rfind('.') {
        Some(pos) if pos > s.rfind('/').map(|p| p + 1).unwrap_or(0) => &s[..pos],
        _ => s,
    }
}

fn extension_of(url: &str) -> Option<String> {
    let path = reqwest::Url::parse(url).ok()?.path().to_string();
    let filename = path.rsplit('/').next()?.to_string();
    let (_, ext) = filename.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}
