//! Sidecar metadata store
//!
//! Per-asset key-value metadata persisted as one JSON document next to the
//! model file (`<base name>.json`). Documents are merged on write, never
//! replaced wholesale unless the caller asks for it; keys this service does
//! not recognize pass through untouched.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use llg_common::json::{load_json_doc, save_json_doc, JsonDoc};
use llg_common::{Error, Result};

use super::resolver::LoraResolver;

/// Sidecar metadata store over a resolver's asset universe
pub struct SidecarStore {
    resolver: Arc<dyn LoraResolver>,
}

impl SidecarStore {
    pub fn new(resolver: Arc<dyn LoraResolver>) -> Self {
        Self { resolver }
    }

    /// Sidecar document path for an asset (`<model path minus extension>.json`)
    pub fn sidecar_path(&self, name: &str) -> Option<PathBuf> {
        self.resolver.resolve(name).map(|p| p.with_extension("json"))
    }

    /// Read an asset's sidecar document.
    ///
    /// A missing or unparsable document reads as empty; so does an
    /// unresolvable asset name.
    pub fn read(&self, name: &str) -> JsonDoc {
        match self.sidecar_path(name) {
            Some(path) => load_json_doc(&path),
            None => JsonDoc::new(),
        }
    }

    /// Write a partial document for an asset.
    ///
    /// With `merge=true` the update is shallow-merged over the current
    /// document; with `merge=false` the update replaces it. Fails only when
    /// the asset name cannot be resolved.
    pub fn write(&self, name: &str, mut update: JsonDoc, merge: bool) -> Result<()> {
        let path = self
            .sidecar_path(name)
            .ok_or_else(|| Error::NotFound(format!("Unknown LoRA: {}", name)))?;

        normalize_update(&mut update);

        let mut doc = if merge { load_json_doc(&path) } else { JsonDoc::new() };
        for (key, value) in update {
            doc.insert(key, value);
        }

        save_json_doc(&doc, &path)
    }

    /// Distinct tags across every known asset, sorted case-insensitively.
    pub fn all_tags(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        for name in self.resolver.list_names() {
            let doc = self.read(&name);
            if let Some(Value::Array(tags)) = doc.get("tags") {
                for tag in tags {
                    if let Value::String(tag) = tag {
                        seen.insert(tag.clone());
                    }
                }
            }
        }

        let mut tags: Vec<String> = seen.into_iter().collect();
        tags.sort_by_key(|t| t.to_lowercase());
        tags
    }
}

/// Normalize recognized fields of a partial update in place.
///
/// Tags become a list of trimmed non-empty strings; `preferred weight` is
/// coerced to a float, and dropped from the update when not coercible.
fn normalize_update(update: &mut JsonDoc) {
    if let Some(value) = update.get_mut("tags") {
        if let Value::Array(items) = value {
            let cleaned: Vec<Value> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => {
                        let trimmed = s.trim();
                        (!trimmed.is_empty()).then(|| Value::String(trimmed.to_string()))
                    }
                    Value::Number(n) => Some(Value::String(n.to_string())),
                    Value::Bool(b) => Some(Value::String(b.to_string())),
                    _ => None,
                })
                .collect();
            *value = Value::Array(cleaned);
        }
    }

    if let Some(value) = update.get("preferred weight") {
        let coerced = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match coerced.and_then(serde_json::Number::from_f64) {
            Some(n) => {
                update.insert("preferred weight".to_string(), Value::Number(n));
            }
            None => {
                update.remove("preferred weight");
            }
        }
    }
}
