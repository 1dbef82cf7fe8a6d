//! Core data types for the gallery sidecar

use serde::{Deserialize, Serialize};

use llg_common::{Error, Result};

use crate::services::preview::PreviewKind;

/// Tag filter combination mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TagMode {
    /// Every requested tag must be present
    And,
    /// At least one requested tag must be present
    #[default]
    Or,
}

impl TagMode {
    /// Parse from a query-string value; anything other than "AND" means OR.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("and") {
            TagMode::And
        } else {
            TagMode::Or
        }
    }
}

/// Filter specification for the listing engine
#[derive(Debug, Clone, Default)]
pub struct FilterSpec {
    /// Case-insensitive name substring (empty = no name filter)
    pub name: String,
    /// Requested tags, lower-cased (empty = no tag filter)
    pub tags: Vec<String>,
    /// Tag combination mode
    pub mode: TagMode,
    /// Exact root-relative folder, "." = directly under a root (None = no folder filter)
    pub folder: Option<String>,
    /// Caller's active selections, kept visible and stably ordered
    pub pinned: Vec<String>,
}

/// Pagination window (1-based)
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: usize,
    pub per_page: usize,
}

impl PageRequest {
    /// Validate that both values are positive.
    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(Error::InvalidInput("page must be a positive integer".to_string()));
        }
        if self.per_page == 0 {
            return Err(Error::InvalidInput(
                "per_page must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-LoRA summary returned by the listing endpoint
///
/// Field names match the sidecar key vocabulary so the listing payload and
/// the sidecar documents stay interchangeable on the wire.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoraSummary {
    pub name: String,
    pub preview_url: String,
    pub preview_type: PreviewKind,
    pub tags: Vec<String>,
    pub download_url: String,
    #[serde(rename = "activation text")]
    pub activation_text: String,
    #[serde(rename = "preferred weight")]
    pub preferred_weight: f64,
    #[serde(rename = "negative text")]
    pub negative_text: String,
    #[serde(rename = "sd version")]
    pub sd_version: String,
    pub notes: String,
}

/// One page of listing results
#[derive(Debug, Clone, Serialize)]
pub struct ListingPage {
    pub loras: Vec<LoraSummary>,
    /// Distinct folders across the whole asset universe (filter-independent)
    pub folders: Vec<String>,
    pub total_pages: usize,
    pub current_page: usize,
}

/// One entry of a user-built adapter selection
///
/// Order within the selection is significant: entries are applied in list
/// order, and trigger words accumulate in the same order.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionEntry {
    /// Asset name; an empty name disables the entry
    #[serde(default)]
    pub lora: String,
    /// Entry toggle
    #[serde(default = "default_on")]
    pub on: bool,
    /// Model strength
    #[serde(default = "default_strength")]
    pub strength: f64,
    /// Encoder strength; defaults to the model strength when absent
    #[serde(default)]
    pub strength_clip: Option<f64>,
    /// Whether to collect this asset's trigger words
    #[serde(default = "default_on")]
    pub use_trigger: bool,
}

fn default_on() -> bool {
    true
}

fn default_strength() -> f64 {
    1.0
}

impl SelectionEntry {
    /// Effective encoder strength (falls back to model strength)
    pub fn clip_strength(&self) -> f64 {
        self.strength_clip.unwrap_or(self.strength)
    }
}

/// Parse a selection payload; malformed JSON yields an empty selection.
pub fn parse_selection(data: &str) -> Vec<SelectionEntry> {
    match serde_json::from_str(data) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!("Malformed selection data, treating as empty: {}", e);
            Vec::new()
        }
    }
}
