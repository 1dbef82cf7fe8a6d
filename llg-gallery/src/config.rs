//! Service configuration for llg-gallery
//!
//! Settings resolve once at startup with CLI → environment → TOML → default
//! priority and are carried in a config struct; nothing is re-read later.

use std::path::PathBuf;

use llg_common::config::{self, TomlConfig};

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 5741;

/// Consolidated legacy metadata file name (pre-sidecar releases)
pub const LEGACY_METADATA_FILE: &str = "lora_gallery_metadata.json";

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    /// Search roots for LoRA model files
    pub lora_roots: Vec<PathBuf>,
    /// Folder for service-owned documents
    pub data_folder: PathBuf,
    /// HTTP listen port
    pub port: u16,
    /// Remote catalog base URL override (None = public catalog)
    pub catalog_base_url: Option<String>,
}

impl GalleryConfig {
    /// Resolve the full configuration from CLI arguments and the ambient
    /// environment.
    pub fn resolve(
        cli_roots: &[PathBuf],
        cli_data_folder: Option<&PathBuf>,
        cli_port: Option<u16>,
    ) -> Self {
        let toml: Option<TomlConfig> = config::load_toml_config();

        let port = cli_port
            .or_else(|| {
                std::env::var("LLG_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
            })
            .or_else(|| toml.as_ref().and_then(|c| c.port))
            .unwrap_or(DEFAULT_PORT);

        let catalog_base_url = std::env::var("LLG_CATALOG_BASE_URL")
            .ok()
            .or_else(|| toml.as_ref().and_then(|c| c.catalog_base_url.clone()));

        Self {
            lora_roots: config::resolve_lora_roots(cli_roots, toml.as_ref()),
            data_folder: config::resolve_data_folder(cli_data_folder, toml.as_ref()),
            port,
            catalog_base_url,
        }
    }

    /// Location of the legacy consolidated metadata document.
    pub fn legacy_metadata_path(&self) -> PathBuf {
        self.data_folder.join(LEGACY_METADATA_FILE)
    }
}
