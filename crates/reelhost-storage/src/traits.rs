//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Callers choose the key (see the `keys` module); backends only persist bytes
/// under it and report where the object can be fetched from.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload data to a specific storage key, attaching `content_type` as object
    /// metadata where the backend supports it. Returns the public URL.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Upload the contents of a local file to a specific storage key without
    /// holding the whole file in memory. The file is left in place.
    async fn upload_file(
        &self,
        storage_key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
