//! llg-gallery - LoRA Gallery Sidecar Service
//!
//! Serves the gallery HTTP API for the pipeline host: LoRA listing with
//! filtering and pinning, sidecar metadata editing, preview media, and
//! remote catalog sync.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use llg_gallery::config::GalleryConfig;
use llg_gallery::services::catalog::CatalogClient;
use llg_gallery::services::docs::DocStore;
use llg_gallery::services::migration::migrate_legacy_metadata;
use llg_gallery::services::resolver::{FsResolver, LoraResolver};
use llg_gallery::services::sidecar::SidecarStore;
use llg_gallery::AppState;

#[derive(Debug, Parser)]
#[command(name = "llg-gallery", about = "LoRA gallery sidecar service")]
struct Args {
    /// LoRA search root (repeatable; highest-priority source)
    #[arg(long = "lora-root")]
    lora_roots: Vec<PathBuf>,

    /// Folder for service-owned documents
    #[arg(long)]
    data_folder: Option<PathBuf>,

    /// HTTP listen port
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting llg-gallery (LoRA Gallery Sidecar)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = GalleryConfig::resolve(
        &args.lora_roots,
        args.data_folder.as_ref(),
        args.port,
    );

    llg_common::config::ensure_data_folder(&config.data_folder)
        .map_err(|e| anyhow::anyhow!("Failed to initialize data folder: {}", e))?;
    for root in &config.lora_roots {
        info!("LoRA search root: {}", root.display());
    }
    info!("Data folder: {}", config.data_folder.display());

    let resolver: Arc<dyn LoraResolver> = Arc::new(FsResolver::new(config.lora_roots.clone()));

    // One-shot legacy metadata migration before the API comes up.
    let store = SidecarStore::new(resolver.clone());
    migrate_legacy_metadata(&config.legacy_metadata_path(), &store);

    let docs = Arc::new(DocStore::new(&config.data_folder));
    let catalog = Arc::new(CatalogClient::new(config.catalog_base_url.clone()));
    let state = AppState::new(resolver, docs, catalog);

    let app = llg_gallery::build_router(state);

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
