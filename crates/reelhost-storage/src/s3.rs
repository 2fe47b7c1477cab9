use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::{
    Attribute, Attributes, ObjectStore, PutMultipartOptions, PutOptions, PutPayload,
    Result as ObjectResult, WriteMultipart,
};
use std::path::Path as FsPath;
use tokio::io::AsyncReadExt;

/// Part size for multipart uploads. S3 requires at least 5 MiB for every part but
/// the last.
const MULTIPART_CHUNK_BYTES: usize = 8 * 1024 * 1024;

/// Parts in flight at once per upload.
const MAX_CONCURRENT_PARTS: usize = 4;

/// Bytes read from disk per iteration.
const READ_BUFFER_BYTES: usize = 256 * 1024;

/// How public URLs for stored objects are built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum S3UrlStrategy {
    /// `https://{distribution}/{key}` through a CDN fronting the bucket.
    Distribution(String),
    /// `https://{bucket}.s3.{region}.amazonaws.com/{key}`, or
    /// `{endpoint}/{bucket}/{key}` for S3-compatible providers.
    Direct,
}

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
    url_strategy: S3UrlStrategy,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `distribution` - Optional CDN host; when set, returned URLs point at it
    pub fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        distribution: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let url_strategy = match distribution {
            Some(host) => S3UrlStrategy::Distribution(host),
            None => S3UrlStrategy::Direct,
        };

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
            url_strategy,
        })
    }

    fn generate_url(&self, key: &str) -> String {
        object_url(
            &self.url_strategy,
            &self.bucket,
            &self.region,
            self.endpoint_url.as_deref(),
            key,
        )
    }
}

/// Build the public URL for `key` under the given strategy.
pub(crate) fn object_url(
    strategy: &S3UrlStrategy,
    bucket: &str,
    region: &str,
    endpoint_url: Option<&str>,
    key: &str,
) -> String {
    match strategy {
        S3UrlStrategy::Distribution(host) => {
            let host = host
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .trim_end_matches('/');
            format!("https://{}/{}", host, key)
        }
        S3UrlStrategy::Direct => match endpoint_url {
            // Path-style for S3-compatible providers
            Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
            None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
        },
    }
}

fn content_type_attributes(content_type: &str) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, content_type.to_string().into());
    attributes
}

/// Stream `source` into `store` at `location` as a multipart upload, so at most
/// a few parts are held in memory. The upload is aborted on failure. Returns the
/// number of bytes sent.
pub(crate) async fn stream_file(
    store: &dyn ObjectStore,
    location: &Path,
    source: &FsPath,
    content_type: &str,
) -> StorageResult<u64> {
    let mut file = tokio::fs::File::open(source).await.map_err(|e| {
        StorageError::UploadFailed(format!("Failed to open {}: {}", source.display(), e))
    })?;

    let opts = PutMultipartOptions {
        attributes: content_type_attributes(content_type),
        ..Default::default()
    };
    let upload = store
        .put_multipart_opts(location, opts)
        .await
        .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
    let mut writer = WriteMultipart::new_with_chunk_size(upload, MULTIPART_CHUNK_BYTES);

    match copy_parts(&mut file, &mut writer, source).await {
        Ok(size) => {
            writer
                .finish()
                .await
                .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
            Ok(size)
        }
        Err(e) => {
            if let Err(abort_err) = writer.abort().await {
                tracing::warn!(
                    error = %abort_err,
                    key = %location,
                    "Failed to abort multipart upload"
                );
            }
            Err(e)
        }
    }
}

async fn copy_parts(
    file: &mut tokio::fs::File,
    writer: &mut WriteMultipart,
    source: &FsPath,
) -> StorageResult<u64> {
    let mut buf = vec![0u8; READ_BUFFER_BYTES];
    let mut size: u64 = 0;

    loop {
        let n = file.read(&mut buf).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to read {}: {}", source.display(), e))
        })?;
        if n == 0 {
            return Ok(size);
        }

        writer
            .wait_for_capacity(MAX_CONCURRENT_PARTS)
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        writer.write(&buf[..n]);
        size += n as u64;
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        let size = data.len() as u64;
        let location = Path::from(storage_key.to_string());
        let start = std::time::Instant::now();

        let opts = PutOptions {
            attributes: content_type_attributes(content_type),
            ..Default::default()
        };

        let result: ObjectResult<_> = ObjectStore::put_opts(
            &self.store,
            &location,
            PutPayload::from(Bytes::from(data)),
            opts,
        )
        .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url = self.generate_url(storage_key);

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(url)
    }

    async fn upload_file(
        &self,
        storage_key: &str,
        source: &FsPath,
        content_type: &str,
    ) -> StorageResult<String> {
        let location = Path::from(storage_key.to_string());
        let start = std::time::Instant::now();

        let size = stream_file(&self.store, &location, source, content_type)
            .await
            .inspect_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 multipart upload failed"
                );
            })?;

        let url = self.generate_url(storage_key);

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 multipart upload successful"
        );

        Ok(url)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use object_store::GetOptions;

    #[tokio::test]
    async fn test_stream_file_uploads_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("prepared.mp4");
        // Several read buffers' worth, not a multiple of the buffer size
        let data: Vec<u8> = (0..(3 * READ_BUFFER_BYTES + 17))
            .map(|i| (i % 251) as u8)
            .collect();
        std::fs::write(&source, &data).unwrap();

        let store = InMemory::new();
        let location = Path::from("landscape/clip.mp4");
        let size = stream_file(&store, &location, &source, "video/mp4")
            .await
            .unwrap();

        assert_eq!(size, data.len() as u64);
        let stored = store
            .get_opts(&location, GetOptions::default())
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(stored.as_ref(), data.as_slice());
        // source is left for its owner to clean up
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_stream_file_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let store = InMemory::new();
        let location = Path::from("other/clip.mp4");

        let result = stream_file(&store, &location, &dir.path().join("gone.mp4"), "video/mp4").await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(store
            .get_opts(&location, GetOptions::default())
            .await
            .is_err());
    }

    #[test]
    fn test_distribution_url() {
        let strategy = S3UrlStrategy::Distribution("d1234.cloudfront.net".to_string());
        assert_eq!(
            object_url(&strategy, "videos", "us-east-1", None, "landscape/abc.mp4"),
            "https://d1234.cloudfront.net/landscape/abc.mp4"
        );

        let strategy = S3UrlStrategy::Distribution("https://d1234.cloudfront.net/".to_string());
        assert_eq!(
            object_url(&strategy, "videos", "us-east-1", None, "other/x.mp4"),
            "https://d1234.cloudfront.net/other/x.mp4"
        );
    }

    #[test]
    fn test_direct_url() {
        assert_eq!(
            object_url(
                &S3UrlStrategy::Direct,
                "videos",
                "eu-west-1",
                None,
                "portrait/abc.mp4"
            ),
            "https://videos.s3.eu-west-1.amazonaws.com/portrait/abc.mp4"
        );
    }

    #[test]
    fn test_direct_url_with_custom_endpoint() {
        assert_eq!(
            object_url(
                &S3UrlStrategy::Direct,
                "videos",
                "us-east-1",
                Some("http://localhost:9000/"),
                "other/abc.mp4"
            ),
            "http://localhost:9000/videos/other/abc.mp4"
        );
    }
}
