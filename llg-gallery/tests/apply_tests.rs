//! Selection application step tests

use std::fs;
use std::sync::{Arc, Mutex};

use serde_json::json;
use tempfile::TempDir;

use llg_gallery::apply::{apply_selection, Accelerator, AdapterBackend, BackendSet};
use llg_gallery::models::parse_selection;
use llg_gallery::services::resolver::{FsResolver, LoraResolver};
use llg_gallery::services::sidecar::SidecarStore;

/// Host model/encoder state stand-in
#[derive(Debug, Default, Clone, PartialEq)]
struct FakeState {
    applied: Vec<(String, f64, f64)>,
}

/// Backend that records every application
struct Recorder {
    label: &'static str,
    log: Arc<Mutex<Vec<&'static str>>>,
    fail_on: Option<&'static str>,
}

impl AdapterBackend<FakeState> for Recorder {
    fn apply(
        &self,
        state: &mut FakeState,
        lora: &str,
        strength_model: f64,
        strength_clip: f64,
    ) -> anyhow::Result<()> {
        if self.fail_on == Some(lora) {
            anyhow::bail!("adapter load failure");
        }
        self.log.lock().unwrap().push(self.label);
        state
            .applied
            .push((lora.to_string(), strength_model, strength_clip));
        Ok(())
    }
}

struct Fixture {
    _dir: TempDir,
    store: SidecarStore,
    log: Arc<Mutex<Vec<&'static str>>>,
}

impl Fixture {
    fn new(sidecars: &[(&str, serde_json::Value)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        for (name, doc) in sidecars {
            fs::write(dir.path().join(name), b"").unwrap();
            let serde_json::Value::Object(doc) = doc.clone() else {
                panic!("sidecar fixture must be an object");
            };
            let resolver: Arc<dyn LoraResolver> =
                Arc::new(FsResolver::new(vec![dir.path().to_path_buf()]));
            SidecarStore::new(resolver).write(name, doc, true).unwrap();
        }
        let resolver: Arc<dyn LoraResolver> =
            Arc::new(FsResolver::new(vec![dir.path().to_path_buf()]));
        Self {
            _dir: dir,
            store: SidecarStore::new(resolver),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn backend(&self, label: &'static str) -> Box<Recorder> {
        Box::new(Recorder {
            label,
            log: self.log.clone(),
            fail_on: None,
        })
    }
}

#[test]
fn test_zero_strength_collects_triggers_without_applying() {
    let fx = Fixture::new(&[("x.safetensors", json!({ "activation text": "cat" }))]);
    let backends = BackendSet::new(fx.backend("standard"));

    let entries = parse_selection(
        r#"[{"lora":"x.safetensors","on":true,"strength":0,"strength_clip":0,"use_trigger":true}]"#,
    );
    let outcome = apply_selection(&backends, None, FakeState::default(), &entries, &fx.store);

    assert_eq!(outcome.trigger_words, "cat");
    assert_eq!(outcome.applied, 0);
    assert!(outcome.state.applied.is_empty());
}

#[test]
fn test_disabled_and_unnamed_entries_skipped() {
    let fx = Fixture::new(&[("x.safetensors", json!({ "activation text": "cat" }))]);
    let backends = BackendSet::new(fx.backend("standard"));

    let entries = parse_selection(
        r#"[
            {"lora":"x.safetensors","on":false},
            {"lora":"","on":true}
        ]"#,
    );
    let outcome = apply_selection(&backends, None, FakeState::default(), &entries, &fx.store);

    assert_eq!(outcome.trigger_words, "");
    assert_eq!(outcome.applied, 0);
}

#[test]
fn test_triggers_accumulate_in_order_with_duplicates() {
    let fx = Fixture::new(&[
        ("a.safetensors", json!({ "activation text": "cat", "negative text": "blurry" })),
        ("b.safetensors", json!({ "activation text": "cat" })),
    ]);
    let backends = BackendSet::new(fx.backend("standard"));

    let entries = parse_selection(
        r#"[
            {"lora":"b.safetensors","strength":0.5},
            {"lora":"a.safetensors","strength":0.5}
        ]"#,
    );
    let outcome = apply_selection(&backends, None, FakeState::default(), &entries, &fx.store);

    assert_eq!(outcome.trigger_words, "cat, cat");
    assert_eq!(outcome.negative_trigger_words, "blurry");
    assert_eq!(outcome.applied, 2);
    assert_eq!(outcome.state.applied[0].0, "b.safetensors");
    assert_eq!(outcome.state.applied[1].0, "a.safetensors");
}

#[test]
fn test_clip_strength_defaults_to_model_strength() {
    let fx = Fixture::new(&[("a.safetensors", json!({}))]);
    let backends = BackendSet::new(fx.backend("standard"));

    let entries = parse_selection(r#"[{"lora":"a.safetensors","strength":0.6}]"#);
    let outcome = apply_selection(&backends, None, FakeState::default(), &entries, &fx.store);

    assert_eq!(outcome.state.applied, vec![("a.safetensors".to_string(), 0.6, 0.6)]);
}

#[test]
fn test_one_failure_does_not_abort_remaining_entries() {
    let fx = Fixture::new(&[
        ("bad.safetensors", json!({ "activation text": "cat" })),
        ("good.safetensors", json!({})),
    ]);
    let backends = BackendSet::new(Box::new(Recorder {
        label: "standard",
        log: fx.log.clone(),
        fail_on: Some("bad.safetensors"),
    }));

    let entries = parse_selection(
        r#"[
            {"lora":"bad.safetensors"},
            {"lora":"good.safetensors"}
        ]"#,
    );
    let outcome = apply_selection(&backends, None, FakeState::default(), &entries, &fx.store);

    // The failing entry still contributed its trigger words.
    assert_eq!(outcome.trigger_words, "cat");
    assert_eq!(outcome.applied, 1);
    assert_eq!(outcome.state.applied[0].0, "good.safetensors");
}

#[test]
fn test_accelerated_backend_selected_once_per_call() {
    let fx = Fixture::new(&[("a.safetensors", json!({})), ("b.safetensors", json!({}))]);
    let backends =
        BackendSet::new(fx.backend("standard")).with_accelerated(Accelerator::Flux, fx.backend("flux"));

    let entries = parse_selection(r#"[{"lora":"a.safetensors"},{"lora":"b.safetensors"}]"#);
    apply_selection(
        &backends,
        Some(Accelerator::Flux),
        FakeState::default(),
        &entries,
        &fx.store,
    );

    assert_eq!(*fx.log.lock().unwrap(), vec!["flux", "flux"]);
}

#[test]
fn test_missing_accelerated_backend_degrades_to_standard() {
    let fx = Fixture::new(&[("a.safetensors", json!({}))]);
    let backends = BackendSet::new(fx.backend("standard"));

    let entries = parse_selection(r#"[{"lora":"a.safetensors"}]"#);
    let outcome = apply_selection(
        &backends,
        Some(Accelerator::Qwen),
        FakeState::default(),
        &entries,
        &fx.store,
    );

    assert_eq!(outcome.applied, 1);
    assert_eq!(*fx.log.lock().unwrap(), vec!["standard"]);
}
