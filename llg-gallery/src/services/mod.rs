//! Service layer for the gallery sidecar

pub mod catalog;
pub mod docs;
pub mod hasher;
pub mod listing;
pub mod migration;
pub mod preview;
pub mod resolver;
pub mod safetensors;
pub mod sidecar;
