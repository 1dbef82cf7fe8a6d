//! Shared types and helpers for the LLG (Local LoRA Gallery) sidecar.
//!
//! Holds the common error type, configuration resolution, and the JSON
//! document file helpers that back sidecar metadata, UI state and presets.

pub mod config;
pub mod error;
pub mod json;

pub use error::{Error, Result};
