//! JSON document file helpers
//!
//! Sidecar metadata, UI state and preset files are all single JSON objects
//! rewritten wholesale on save. A missing, empty or unparsable file reads as
//! an empty document; parse failures are logged and never fatal.

use std::path::Path;

use serde_json::{Map, Value};

use crate::Result;

/// A flat JSON object document (string keys, arbitrary values)
pub type JsonDoc = Map<String, Value>;

/// Load a JSON object from `path`.
///
/// Returns an empty document when the file is missing, empty, unreadable,
/// unparsable, or parses to something other than an object.
pub fn load_json_doc(path: &Path) -> JsonDoc {
    if !path.exists() {
        return JsonDoc::new();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", path.display(), e);
            return JsonDoc::new();
        }
    };

    if content.trim().is_empty() {
        return JsonDoc::new();
    }

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            tracing::warn!("Expected a JSON object in {}", path.display());
            JsonDoc::new()
        }
        Err(e) => {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            JsonDoc::new()
        }
    }
}

/// Save a JSON object to `path` (whole-file rewrite, pretty-printed).
pub fn save_json_doc(doc: &JsonDoc, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(&Value::Object(doc.clone()))?;
    std::fs::write(path, content)?;
    Ok(())
}
