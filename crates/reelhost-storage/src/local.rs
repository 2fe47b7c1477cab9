use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance, creating `base_path` if it is missing.
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "./assets")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8091/assets")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);

        builder.create(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path, rejecting keys that could escape
    /// the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() {
            return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
        }
        if storage_key.contains("..") || storage_key.starts_with('/') || storage_key.contains('\\')
        {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(storage_key);

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn upload_file(
        &self,
        storage_key: &str,
        source: &Path,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let bytes_copied = fs::copy(source, &path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                source.display(),
                path.display(),
                e
            ))
        })?;

        let url = self.generate_url(storage_key);

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage file upload successful"
        );

        Ok(url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_new_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("nested").join("assets");
        assert!(!root.exists());

        LocalStorage::new(&root, "http://localhost:8091/assets".to_string())
            .await
            .unwrap();
        assert!(root.is_dir());
    }

    #[tokio::test]
    async fn test_upload_with_key_writes_file_and_returns_url() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:8091/assets/".to_string())
            .await
            .unwrap();

        let url = storage
            .upload_with_key("thumb.png", b"png bytes".to_vec(), "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:8091/assets/thumb.png");
        assert_eq!(std::fs::read(dir.path().join("thumb.png")).unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn test_upload_file_creates_prefix_directory() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("store"), "http://cdn".to_string())
            .await
            .unwrap();
        let source = dir.path().join("input.mp4");
        std::fs::write(&source, b"mp4").unwrap();

        let url = storage
            .upload_file("portrait/clip.mp4", &source, "video/mp4")
            .await
            .unwrap();

        assert_eq!(url, "http://cdn/portrait/clip.mp4");
        assert!(dir.path().join("store/portrait/clip.mp4").is_file());
        // source is left in place for its owner to clean up
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:8091/assets".to_string())
            .await
            .unwrap();

        let result = storage
            .upload_with_key("../escape.png", vec![1], "image/png")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let source = dir.path().join("input.mp4");
        std::fs::write(&source, b"mp4").unwrap();
        let result = storage
            .upload_file("/etc/passwd", &source, "video/mp4")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
