//! Deterministic stand-ins for the durable store and the external media tools.

use async_trait::async_trait;
use reelhost_core::{AppError, StorageBackend, Video};
use reelhost_db::{InMemoryVideoRepository, VideoRepository};
use reelhost_processing::faststart::output_path_for;
use reelhost_processing::{
    AspectRatio, ProbeResult, ProcessingError, ProcessingResult, ScopedFile, VideoProber,
    VideoTranscoder,
};
use reelhost_storage::{Storage, StorageResult};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const CDN_BASE: &str = "https://cdn.example.com";

#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub key: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Keeps every write in memory so tests can assert on keys and counts.
#[derive(Default)]
pub struct RecordingStorage {
    uploads: Mutex<Vec<RecordedUpload>>,
}

impl RecordingStorage {
    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.uploads.lock().unwrap().clone()
    }
}

impl RecordingStorage {
    fn url_for(storage_key: &str) -> String {
        format!("{}/{}", CDN_BASE, storage_key)
    }
}

#[async_trait]
impl Storage for RecordingStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        self.uploads.lock().unwrap().push(RecordedUpload {
            key: storage_key.to_string(),
            content_type: content_type.to_string(),
            data,
        });
        Ok(Self::url_for(storage_key))
    }

    async fn upload_file(
        &self,
        storage_key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<String> {
        let data = std::fs::read(path)?;
        self.upload_with_key(storage_key, data, content_type).await
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

/// Reports a fixed display aspect ratio, or fails like a file with no streams.
pub struct FakeProber {
    pub display_aspect_ratio: Option<&'static str>,
}

#[async_trait]
impl VideoProber for FakeProber {
    async fn probe(&self, path: &Path) -> ProcessingResult<ProbeResult> {
        assert!(path.exists(), "probe ran on a missing file");
        match self.display_aspect_ratio {
            Some(ratio) => Ok(ProbeResult {
                display_aspect_ratio: ratio.to_string(),
                aspect_ratio: AspectRatio::classify(ratio),
            }),
            None => Err(ProcessingError::NoStreams),
        }
    }
}

/// Copies the input to the sibling output path, prefixed with a marker so tests
/// can tell the stored bytes went through this step.
pub struct FakeTranscoder;

pub const FASTSTART_MARKER: &[u8] = b"moov:";

#[async_trait]
impl VideoTranscoder for FakeTranscoder {
    async fn transcode(&self, input: &Path) -> ProcessingResult<ScopedFile> {
        let output = ScopedFile::new(output_path_for(input));
        let mut data = FASTSTART_MARKER.to_vec();
        data.extend(std::fs::read(input).map_err(|source| ProcessingError::MissingOutput {
            path: input.to_path_buf(),
            source,
        })?);
        std::fs::write(output.path(), data).map_err(|source| ProcessingError::MissingOutput {
            path: output.path().to_path_buf(),
            source,
        })?;
        Ok(output)
    }
}

/// Exits non-zero like an ffmpeg run on a corrupt file.
pub struct FailingTranscoder;

#[async_trait]
impl VideoTranscoder for FailingTranscoder {
    async fn transcode(&self, input: &Path) -> ProcessingResult<ScopedFile> {
        assert!(input.exists(), "transcode ran on a missing file");
        Err(ProcessingError::ToolFailed {
            tool: "ffmpeg",
            status: "exit status: 1".to_string(),
            stderr: "moov atom not found".to_string(),
        })
    }
}

/// Reads from the wrapped store but fails every update, like a dropped database
/// connection.
pub struct FailingUpdateRepository(pub Arc<InMemoryVideoRepository>);

#[async_trait]
impl VideoRepository for FailingUpdateRepository {
    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        self.0.create_video(video).await
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        self.0.get_video(id).await
    }

    async fn update_video(&self, _video: &Video) -> Result<Video, AppError> {
        Err(AppError::Internal("connection reset by peer".to_string()))
    }
}
