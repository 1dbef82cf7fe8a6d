//! Selection application step
//!
//! Consumes a user-built ordered adapter selection and applies each entry to
//! a mutable model/encoder state through an adapter backend, collecting
//! trigger-word side metadata from sidecar documents along the way.
//!
//! Backend choice is made once per invocation from the model state's
//! accelerator capability tag (declared at model construction); it is never
//! re-inspected per entry. A missing accelerated backend degrades to the
//! standard one. One entry failing to apply is logged and skipped, leaving
//! the remaining entries to proceed.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::SelectionEntry;
use crate::services::sidecar::SidecarStore;

/// Accelerator capability tag carried by a model state.
///
/// Declared when the host constructs the model, replacing any runtime
/// inspection of the wrapper's concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accelerator {
    Flux,
    Qwen,
    ZImage,
}

/// Adapter application boundary, polymorphic over backend variants.
///
/// `S` is the host-owned model/encoder state. Model-only backends ignore the
/// encoder strength.
pub trait AdapterBackend<S>: Send + Sync {
    fn apply(
        &self,
        state: &mut S,
        lora: &str,
        strength_model: f64,
        strength_clip: f64,
    ) -> anyhow::Result<()>;
}

/// The backends available for this process, resolved once at startup.
pub struct BackendSet<S> {
    standard: Box<dyn AdapterBackend<S>>,
    accelerated: HashMap<Accelerator, Box<dyn AdapterBackend<S>>>,
}

impl<S> BackendSet<S> {
    pub fn new(standard: Box<dyn AdapterBackend<S>>) -> Self {
        Self {
            standard,
            accelerated: HashMap::new(),
        }
    }

    /// Register an accelerated backend variant.
    pub fn with_accelerated(
        mut self,
        accelerator: Accelerator,
        backend: Box<dyn AdapterBackend<S>>,
    ) -> Self {
        self.accelerated.insert(accelerator, backend);
        self
    }

    /// Pick the backend for a model's capability tag, degrading to the
    /// standard backend when no accelerated variant is registered.
    pub fn select(&self, accelerator: Option<Accelerator>) -> &dyn AdapterBackend<S> {
        match accelerator {
            Some(tag) => match self.accelerated.get(&tag) {
                Some(backend) => backend.as_ref(),
                None => {
                    tracing::debug!(
                        "No accelerated backend for {:?}, using standard loader",
                        tag
                    );
                    self.standard.as_ref()
                }
            },
            None => self.standard.as_ref(),
        }
    }
}

/// Result of applying a selection
#[derive(Debug)]
pub struct SelectionOutcome<S> {
    /// The updated model/encoder state
    pub state: S,
    /// Positive trigger words, `", "`-joined in processing order
    pub trigger_words: String,
    /// Negative trigger words, `", "`-joined in processing order
    pub negative_trigger_words: String,
    /// Number of adapters actually applied
    pub applied: usize,
}

/// Apply an ordered selection to the given state.
pub fn apply_selection<S>(
    backends: &BackendSet<S>,
    accelerator: Option<Accelerator>,
    mut state: S,
    entries: &[SelectionEntry],
    sidecars: &SidecarStore,
) -> SelectionOutcome<S> {
    let backend = backends.select(accelerator);

    let mut triggers: Vec<String> = Vec::new();
    let mut negative_triggers: Vec<String> = Vec::new();
    let mut applied = 0;

    for entry in entries {
        if !entry.on || entry.lora.is_empty() {
            continue;
        }

        if entry.use_trigger {
            let doc = sidecars.read(&entry.lora);
            let field = |key: &str| -> Option<String> {
                doc.get(key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            };
            if let Some(words) = field("activation text") {
                triggers.push(words);
            }
            if let Some(words) = field("negative text") {
                negative_triggers.push(words);
            }
        }

        let strength_model = entry.strength;
        let strength_clip = entry.clip_strength();
        if strength_model == 0.0 && strength_clip == 0.0 {
            continue;
        }

        match backend.apply(&mut state, &entry.lora, strength_model, strength_clip) {
            Ok(()) => applied += 1,
            Err(e) => {
                tracing::warn!("Failed to apply LoRA '{}': {}", entry.lora, e);
            }
        }
    }

    tracing::info!("Applied {} LoRA(s)", applied);

    SelectionOutcome {
        state,
        trigger_words: triggers.join(", "),
        negative_trigger_words: negative_triggers.join(", "),
        applied,
    }
}
