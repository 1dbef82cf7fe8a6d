//! Preview media resolution
//!
//! A preview for a LoRA is a sibling media file sharing the model's base
//! name. Image extensions are tried before video extensions; the first
//! existing match wins, so an image always beats a video sibling.

use std::path::PathBuf;

use serde::Serialize;

use super::resolver::LoraResolver;

/// Preview image extensions, in match order
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif"];

/// Preview video extensions, in match order (tried after images)
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "mov", "avi"];

/// Preview media classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewKind {
    Image,
    Video,
    None,
}

/// Locate preview media for an asset.
///
/// Returns the serving URL for the preview endpoint and the media kind, or
/// `(None, PreviewKind::None)` when no sibling media exists.
pub fn resolve_preview(resolver: &dyn LoraResolver, name: &str) -> (Option<String>, PreviewKind) {
    let Some(lora_path) = resolver.resolve(name) else {
        return (None, PreviewKind::None);
    };

    for ext in IMAGE_EXTENSIONS.iter().chain(VIDEO_EXTENSIONS.iter()) {
        let candidate = lora_path.with_extension(ext);
        if !candidate.is_file() {
            continue;
        }

        let Some(filename) = candidate.file_name().and_then(|f| f.to_str()) else {
            continue;
        };

        let kind = if VIDEO_EXTENSIONS.contains(ext) {
            PreviewKind::Video
        } else {
            PreviewKind::Image
        };

        let url = format!(
            "/api/preview?lora_name={}&filename={}",
            urlencoding::encode(name),
            urlencoding::encode(filename)
        );
        return (Some(url), kind);
    }

    (None, PreviewKind::None)
}

/// Resolve a preview filename to its on-disk path, sibling to the asset.
///
/// The caller validates the filename against traversal before calling.
pub fn preview_file(resolver: &dyn LoraResolver, name: &str, filename: &str) -> Option<PathBuf> {
    let lora_path = resolver.resolve(name)?;
    let path = lora_path.parent()?.join(filename);
    path.is_file().then_some(path)
}

/// Content type for serving a preview file
pub fn content_type_for(filename: &str) -> &'static str {
    match filename.rsplit('.').next().map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("mp4") => "video/mp4",
        Some("webm") => "video/webm",
        Some("mov") => "video/quicktime",
        Some("avi") => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}
