//! Legacy metadata migration
//!
//! Older releases kept one consolidated JSON document for every LoRA. On
//! startup that document is split into per-asset sidecar files, translating
//! the old key vocabulary, and the legacy file is renamed to mark it
//! consumed. Existing sidecar keys are never overwritten, which also makes a
//! second run over the same inputs a no-op.

use std::ffi::OsString;
use std::path::Path;

use serde_json::Value;

use llg_common::json::{load_json_doc, JsonDoc};

use super::sidecar::SidecarStore;

/// Translate a legacy key to the sidecar vocabulary.
fn rename_key(old_key: &str) -> &str {
    match old_key {
        "trigger_words" => "activation text",
        "preferred_weight" => "preferred weight",
        "negative_prompt" => "negative text",
        "sd_version" => "sd version",
        other => other,
    }
}

/// Whether a legacy value is worth carrying over.
fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Run the one-shot legacy migration. Returns the number of assets whose
/// sidecar document gained at least one key.
///
/// Missing legacy file is a no-op. Assets that no longer resolve are
/// skipped. A failed rename of the consumed legacy file is reported but
/// non-fatal; the sidecar writes already happened.
pub fn migrate_legacy_metadata(legacy_path: &Path, store: &SidecarStore) -> usize {
    if !legacy_path.exists() {
        return 0;
    }

    tracing::info!("Migrating legacy metadata from {}", legacy_path.display());
    let legacy = load_json_doc(legacy_path);
    let mut migrated = 0;

    for (name, old_meta) in &legacy {
        let Value::Object(old_meta) = old_meta else {
            tracing::warn!("Legacy entry for '{}' is not an object, skipping", name);
            continue;
        };

        if store.sidecar_path(name).is_none() {
            tracing::debug!("Legacy entry '{}' no longer resolves, skipping", name);
            continue;
        }

        let current = store.read(name);
        let mut update = JsonDoc::new();

        for (old_key, value) in old_meta {
            let new_key = rename_key(old_key);
            if current.contains_key(new_key) || is_empty_value(value) {
                continue;
            }
            if new_key == "tags" && !value.is_array() {
                continue;
            }
            update.insert(new_key.to_string(), value.clone());
        }

        if update.is_empty() {
            continue;
        }

        match store.write(name, update, true) {
            Ok(()) => migrated += 1,
            Err(e) => tracing::warn!("Failed to write migrated sidecar for '{}': {}", name, e),
        }
    }

    let mut consumed: OsString = legacy_path.as_os_str().to_owned();
    consumed.push(".migrated");
    if let Err(e) = std::fs::rename(legacy_path, &consumed) {
        tracing::warn!(
            "Migration finished but failed to rename legacy file {}: {}",
            legacy_path.display(),
            e
        );
    }

    tracing::info!("Legacy migration complete: {} asset(s) updated", migrated);
    migrated
}
