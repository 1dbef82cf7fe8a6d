//! Content digest computation
//!
//! SHA-256 over the model file, computed lazily on first catalog sync and
//! cached in the sidecar document under the `hash` key.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use llg_common::Result;

/// Compute the SHA-256 digest of a file, hex-encoded.
///
/// Reads in 8 KiB chunks; model files run into the gigabytes.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        std::fs::write(&path, b"test content").unwrap();

        let hash = sha256_file(&path).unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, format!("{:x}", Sha256::digest(b"test content")));
    }

    #[test]
    fn test_sha256_missing_file_errors() {
        assert!(sha256_file(Path::new("/nonexistent/model.safetensors")).is_err());
    }
}
