//! llg-gallery - LoRA gallery sidecar service
//!
//! Browses locally stored LoRA model files, maintains their per-asset
//! sidecar metadata, resolves preview media, syncs descriptive metadata from
//! a remote catalog, and applies user-built adapter selections to a
//! model/encoder state on behalf of the host's execution graph.

pub mod api;
pub mod apply;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};

use crate::services::catalog::CatalogClient;
use crate::services::docs::DocStore;
use crate::services::resolver::LoraResolver;
use crate::services::sidecar::SidecarStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Asset name resolution over the configured search roots
    pub resolver: Arc<dyn LoraResolver>,
    /// Per-asset sidecar metadata store
    pub sidecars: Arc<SidecarStore>,
    /// UI state and preset persistence
    pub docs: Arc<DocStore>,
    /// Remote catalog client
    pub catalog: Arc<CatalogClient>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        resolver: Arc<dyn LoraResolver>,
        docs: Arc<DocStore>,
        catalog: Arc<CatalogClient>,
    ) -> Self {
        let sidecars = Arc::new(SidecarStore::new(resolver.clone()));
        Self {
            resolver,
            sidecars,
            docs,
            catalog,
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::lora_routes())
        .merge(api::preview_routes())
        .merge(api::sync_routes())
        .merge(api::training_routes())
        .merge(api::ui_state_routes())
        .merge(api::preset_routes())
        .with_state(state)
}
