//! Safetensors header metadata reader
//!
//! A safetensors file starts with an 8-byte little-endian length followed by
//! a JSON header. Training tools stash free-form key/value pairs under the
//! header's `__metadata__` entry; that map is all this service reads.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use llg_common::json::JsonDoc;

/// Headers larger than this are considered corrupt.
const MAX_HEADER_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum HeaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Header length {0} exceeds limit")]
    OversizedHeader(u64),

    #[error("Malformed header: {0}")]
    Malformed(String),
}

/// Read the `__metadata__` map embedded in a safetensors file header.
///
/// Returns an empty document when the header carries no metadata entry.
pub fn read_training_metadata(path: &Path) -> Result<JsonDoc, HeaderError> {
    let mut file = File::open(path)?;

    let mut len_bytes = [0u8; 8];
    file.read_exact(&mut len_bytes)?;
    let header_len = u64::from_le_bytes(len_bytes);
    if header_len > MAX_HEADER_BYTES {
        return Err(HeaderError::OversizedHeader(header_len));
    }

    let mut header = vec![0u8; header_len as usize];
    file.read_exact(&mut header)?;

    let header: Value = serde_json::from_slice(&header)
        .map_err(|e| HeaderError::Malformed(e.to_string()))?;

    match header.get("__metadata__") {
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(_) => Err(HeaderError::Malformed(
            "__metadata__ is not an object".to_string(),
        )),
        None => Ok(JsonDoc::new()),
    }
}
