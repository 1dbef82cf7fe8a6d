//! LoRA file resolution
//!
//! Maps path-like asset names to absolute file locations under the
//! configured search roots, and enumerates the known asset universe.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// File extensions recognized as LoRA model files
pub const MODEL_EXTENSIONS: &[&str] = &["safetensors", "st", "ckpt", "pt"];

/// Asset path resolution boundary
///
/// The listing engine, sidecar store and migrator all go through this trait;
/// tests substitute fixture-backed implementations.
pub trait LoraResolver: Send + Sync {
    /// Resolve an asset name to its absolute file location, if it exists.
    fn resolve(&self, name: &str) -> Option<PathBuf>;

    /// Ordered list of configured search roots.
    fn roots(&self) -> &[PathBuf];

    /// Ordered list of all known asset names (root-relative, `/`-separated).
    fn list_names(&self) -> Vec<String>;
}

/// Filesystem-backed resolver scanning the configured search roots
pub struct FsResolver {
    roots: Vec<PathBuf>,
}

impl FsResolver {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    fn is_model_file(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                MODEL_EXTENSIONS.contains(&e.as_str())
            })
            .unwrap_or(false)
    }
}

impl LoraResolver for FsResolver {
    fn resolve(&self, name: &str) -> Option<PathBuf> {
        // Names are caller-supplied; refuse upward traversal outright.
        if name.is_empty() || name.split(['/', '\\']).any(|part| part == "..") {
            return None;
        }

        for root in &self.roots {
            let candidate = root.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }

    fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    fn list_names(&self) -> Vec<String> {
        let mut names = Vec::new();

        for root in &self.roots {
            if !root.is_dir() {
                tracing::debug!("Skipping missing search root {}", root.display());
                continue;
            }

            for entry in WalkDir::new(root).follow_links(false) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        tracing::warn!("Error scanning {}: {}", root.display(), e);
                        continue;
                    }
                };

                if !entry.file_type().is_file() || !Self::is_model_file(entry.path()) {
                    continue;
                }

                match entry.path().strip_prefix(root) {
                    Ok(relative) => {
                        let name = relative
                            .components()
                            .map(|c| c.as_os_str().to_string_lossy())
                            .collect::<Vec<_>>()
                            .join("/");
                        names.push(name);
                    }
                    Err(_) => continue,
                }
            }
        }

        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_list_names_finds_model_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.safetensors"));
        touch(&dir.path().join("styles/b.ckpt"));
        touch(&dir.path().join("readme.txt"));

        let resolver = FsResolver::new(vec![dir.path().to_path_buf()]);
        let mut names = resolver.list_names();
        names.sort();
        assert_eq!(names, vec!["a.safetensors", "styles/b.ckpt"]);
    }

    #[test]
    fn test_resolve_known_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("styles/b.safetensors"));

        let resolver = FsResolver::new(vec![dir.path().to_path_buf()]);
        let path = resolver.resolve("styles/b.safetensors").unwrap();
        assert!(path.is_file());
        assert!(resolver.resolve("missing.safetensors").is_none());
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.safetensors"));

        let resolver = FsResolver::new(vec![dir.path().join("sub")]);
        assert!(resolver.resolve("../a.safetensors").is_none());
    }
}
