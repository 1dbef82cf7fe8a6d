//! LoRA listing engine
//!
//! Produces a deterministic, stably ordered page of asset summaries for a
//! filter specification and pagination window. Pinned assets (the caller's
//! active selections) that survive filtering are kept at the front of the
//! ordering, in the order the caller gave them, so selections stay visible
//! and stably positioned while the user re-filters.

use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;

use llg_common::json::JsonDoc;
use llg_common::Result;

use crate::models::{FilterSpec, ListingPage, LoraSummary, PageRequest, TagMode};
use crate::services::preview::resolve_preview;
use crate::services::resolver::LoraResolver;
use crate::services::sidecar::SidecarStore;

/// Run the listing pipeline: enumerate, filter, pin, sort, paginate,
/// summarize.
pub fn list_loras(
    resolver: &dyn LoraResolver,
    store: &SidecarStore,
    filter: &FilterSpec,
    page: PageRequest,
) -> Result<ListingPage> {
    page.validate()?;

    let name_needle = filter.name.to_lowercase();
    let mut all_folders: HashSet<String> = HashSet::new();
    let mut filtered: Vec<String> = Vec::new();

    for name in resolver.list_names() {
        let Some(path) = resolver.resolve(&name) else {
            continue;
        };

        let Some(folder) = folder_for(&path, resolver.roots()) else {
            tracing::warn!(
                "Could not find a search root containing {}. Skipping.",
                path.display()
            );
            continue;
        };
        all_folders.insert(folder.clone());

        if !name_needle.is_empty() && !name.to_lowercase().contains(&name_needle) {
            continue;
        }

        if let Some(wanted) = &filter.folder {
            if *wanted != folder {
                continue;
            }
        }

        if !filter.tags.is_empty() && !matches_tags(&store.read(&name), filter) {
            continue;
        }

        filtered.push(name);
    }

    // Pinned assets are extracted from the filtered set, preserving the
    // pinned list's own order; everything else sorts by name.
    let pinned_set: HashSet<&str> = filter.pinned.iter().map(String::as_str).collect();
    let survivors: HashSet<&str> = filtered.iter().map(String::as_str).collect();

    let pinned: Vec<String> = filter
        .pinned
        .iter()
        .filter(|name| survivors.contains(name.as_str()))
        .cloned()
        .collect();
    let mut remaining: Vec<String> = filtered
        .iter()
        .filter(|name| !pinned_set.contains(name.as_str()))
        .cloned()
        .collect();
    remaining.sort_by_key(|name| name.to_lowercase());

    let ordered: Vec<String> = pinned.into_iter().chain(remaining).collect();

    let total = ordered.len();
    let total_pages = (total + page.per_page - 1) / page.per_page;
    let start = (page.page - 1).saturating_mul(page.per_page);
    // Out-of-range pages yield an empty slice, not an error.
    let page_names: &[String] = if start >= total {
        &ordered[0..0]
    } else {
        &ordered[start..total.min(start + page.per_page)]
    };

    let loras = page_names
        .iter()
        .map(|name| summarize(resolver, store, name))
        .collect();

    let mut folders: Vec<String> = all_folders.into_iter().collect();
    folders.sort_by_key(|f| f.to_lowercase());

    Ok(ListingPage {
        loras,
        folders,
        total_pages,
        current_page: page.page,
    })
}

/// Root-relative folder for an asset path ("." for assets directly under a
/// root), or None when the path is outside every configured root.
fn folder_for(path: &Path, roots: &[std::path::PathBuf]) -> Option<String> {
    for root in roots {
        if let Ok(relative) = path.strip_prefix(root) {
            let parent = relative.parent().unwrap_or_else(|| Path::new(""));
            if parent.as_os_str().is_empty() {
                return Some(".".to_string());
            }
            let folder = parent
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            return Some(folder);
        }
    }
    None
}

/// Tag filter: AND requires every requested tag, OR requires at least one.
/// Comparison is over the asset's lower-cased sidecar tags.
fn matches_tags(doc: &JsonDoc, filter: &FilterSpec) -> bool {
    let tags: Vec<String> = match doc.get("tags") {
        Some(Value::Array(tags)) => tags
            .iter()
            .filter_map(|t| t.as_str())
            .map(|t| t.to_lowercase())
            .collect(),
        _ => Vec::new(),
    };

    match filter.mode {
        TagMode::And => filter.tags.iter().all(|t| tags.contains(t)),
        TagMode::Or => filter.tags.iter().any(|t| tags.contains(t)),
    }
}

/// Build a page summary for one asset, filling documented defaults.
fn summarize(resolver: &dyn LoraResolver, store: &SidecarStore, name: &str) -> LoraSummary {
    let doc = store.read(name);
    let (preview_url, preview_type) = resolve_preview(resolver, name);

    let text = |key: &str| -> String {
        doc.get(key).and_then(Value::as_str).unwrap_or("").to_string()
    };

    LoraSummary {
        name: name.to_string(),
        preview_url: preview_url.unwrap_or_default(),
        preview_type,
        tags: match doc.get("tags") {
            Some(Value::Array(tags)) => tags
                .iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        },
        download_url: text("download_url"),
        activation_text: text("activation text"),
        preferred_weight: doc
            .get("preferred weight")
            .and_then(Value::as_f64)
            .unwrap_or(1.0),
        negative_text: text("negative text"),
        sd_version: doc
            .get("sd version")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string(),
        notes: text("notes"),
    }
}
