//! Flat document store for UI collapse-state and named presets
//!
//! Both documents live in the service data folder as single JSON files.
//! Values are opaque to this service; UI state entries are shallow-merged
//! on write, presets are replaced wholesale.

use std::path::PathBuf;

use serde_json::{json, Value};

use llg_common::json::{load_json_doc, save_json_doc, JsonDoc};
use llg_common::Result;

const UI_STATE_FILE: &str = "lora_gallery_ui_state.json";
const PRESETS_FILE: &str = "lora_gallery_presets.json";

/// UI state and preset persistence
pub struct DocStore {
    ui_state_path: PathBuf,
    presets_path: PathBuf,
}

impl DocStore {
    pub fn new(data_folder: &std::path::Path) -> Self {
        Self {
            ui_state_path: data_folder.join(UI_STATE_FILE),
            presets_path: data_folder.join(PRESETS_FILE),
        }
    }

    /// Composite key scoping one gallery widget's state
    pub fn ui_state_key(gallery_id: &str, node_id: &str) -> String {
        format!("{}_{}", gallery_id, node_id)
    }

    /// Read one widget's UI state; unknown keys get the expanded default.
    pub fn get_ui_state(&self, key: &str) -> Value {
        let states = load_json_doc(&self.ui_state_path);
        states
            .get(key)
            .cloned()
            .unwrap_or_else(|| json!({ "is_collapsed": false }))
    }

    /// Shallow-merge a state patch into one widget's UI state.
    pub fn set_ui_state(&self, key: &str, patch: JsonDoc) -> Result<()> {
        let mut states = load_json_doc(&self.ui_state_path);

        let entry = states
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(JsonDoc::new()));
        if let Value::Object(existing) = entry {
            for (k, v) in patch {
                existing.insert(k, v);
            }
        } else {
            *entry = Value::Object(patch);
        }

        save_json_doc(&states, &self.ui_state_path)
    }

    /// All named presets.
    pub fn presets(&self) -> JsonDoc {
        load_json_doc(&self.presets_path)
    }

    /// Save (or replace) a named preset.
    pub fn save_preset(&self, name: &str, data: Value) -> Result<JsonDoc> {
        let mut presets = load_json_doc(&self.presets_path);
        presets.insert(name.to_string(), data);
        save_json_doc(&presets, &self.presets_path)?;
        Ok(presets)
    }

    /// Delete a named preset; deleting a missing preset is a no-op.
    pub fn delete_preset(&self, name: &str) -> Result<JsonDoc> {
        let mut presets = load_json_doc(&self.presets_path);
        if presets.remove(name).is_some() {
            save_json_doc(&presets, &self.presets_path)?;
        }
        Ok(presets)
    }
}
