#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use reelhost_core::Config;
use std::sync::Arc;

/// Create the durable backend that uploaded videos are stored in.
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket
                .clone()
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region.clone().ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;

            let storage = S3Storage::new(
                bucket,
                region,
                config.s3_endpoint.clone(),
                config.s3_cf_distribution.clone(),
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage =
                LocalStorage::new(config.assets_root.clone(), config.assets_base_url()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

/// Create the local asset store that thumbnails are written to. The directory is
/// created if it does not exist.
#[cfg(feature = "storage-local")]
pub async fn create_asset_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    let storage = LocalStorage::new(config.assets_root.clone(), config.assets_base_url()).await?;
    Ok(Arc::new(storage))
}
