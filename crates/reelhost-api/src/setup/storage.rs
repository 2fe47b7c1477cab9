//! Storage setup and initialization

use anyhow::{Context, Result};
use reelhost_core::Config;
use reelhost_storage::{create_asset_storage, create_storage, Storage};
use std::sync::Arc;

/// Durable video storage and the local asset store used for thumbnails.
pub struct StorageSetup {
    pub videos: Arc<dyn Storage>,
    pub assets: Arc<dyn Storage>,
}

pub async fn setup_storage(config: &Config) -> Result<StorageSetup> {
    tracing::info!("Initializing storage abstraction...");
    let videos = create_storage(config)
        .await
        .context("Failed to initialize video storage")?;
    let assets = create_asset_storage(config)
        .await
        .context("Failed to initialize asset directory")?;

    tracing::info!(
        backend = %videos.backend_type(),
        assets_root = %config.assets_root.display(),
        "Storage initialized successfully"
    );

    Ok(StorageSetup { videos, assets })
}
