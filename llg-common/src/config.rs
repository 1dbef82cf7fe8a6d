//! Configuration loading and search root resolution
//!
//! Resolution priority for every setting:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// TOML config file contents (`~/.config/llg/config.toml`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TomlConfig {
    /// Search roots for LoRA model files
    pub lora_roots: Option<Vec<String>>,
    /// Folder for service-owned documents (legacy metadata, UI state, presets)
    pub data_folder: Option<String>,
    /// HTTP listen port
    pub port: Option<u16>,
    /// Remote catalog base URL override
    pub catalog_base_url: Option<String>,
}

/// Load the TOML config file if one exists at the platform config location.
pub fn load_toml_config() -> Option<TomlConfig> {
    let path = config_file_path()?;
    if !path.exists() {
        return None;
    }
    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("Failed to read config file {}: {}", path.display(), e);
            return None;
        }
    };
    match toml::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("Failed to parse config file {}: {}", path.display(), e);
            None
        }
    }
}

/// Platform config file path (`<config dir>/llg/config.toml`)
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("llg").join("config.toml"))
}

/// Resolve the LoRA search roots.
///
/// Environment variable `LLG_LORA_ROOTS` holds paths separated by the
/// platform path-list separator (`:` on Unix, `;` on Windows).
pub fn resolve_lora_roots(cli_roots: &[PathBuf], toml_config: Option<&TomlConfig>) -> Vec<PathBuf> {
    if !cli_roots.is_empty() {
        return cli_roots.to_vec();
    }

    if let Ok(value) = std::env::var("LLG_LORA_ROOTS") {
        let roots: Vec<PathBuf> = std::env::split_paths(&value).collect();
        if !roots.is_empty() {
            return roots;
        }
    }

    if let Some(roots) = toml_config.and_then(|c| c.lora_roots.as_ref()) {
        if !roots.is_empty() {
            return roots.iter().map(PathBuf::from).collect();
        }
    }

    vec![default_data_folder().join("loras")]
}

/// Resolve the service data folder (legacy metadata, UI state, presets).
pub fn resolve_data_folder(cli_arg: Option<&PathBuf>, toml_config: Option<&TomlConfig>) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.clone();
    }

    if let Ok(path) = std::env::var("LLG_DATA_FOLDER") {
        return PathBuf::from(path);
    }

    if let Some(path) = toml_config.and_then(|c| c.data_folder.as_ref()) {
        return PathBuf::from(path);
    }

    default_data_folder()
}

/// OS-dependent default data folder
fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("llg"))
        .unwrap_or_else(|| PathBuf::from("./llg_data"))
}

/// Create the data folder if it does not exist yet.
pub fn ensure_data_folder(path: &PathBuf) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(Error::Config(format!(
                "Data folder path exists but is not a directory: {}",
                path.display()
            )));
        }
        return Ok(());
    }
    std::fs::create_dir_all(path)
        .map_err(|e| Error::Config(format!("Failed to create {}: {}", path.display(), e)))
}
