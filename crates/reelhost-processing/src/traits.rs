use crate::cleanup::ScopedFile;
use crate::error::ProcessingResult;
use crate::probe::ProbeResult;
use async_trait::async_trait;
use std::path::Path;

/// Extracts stream metadata from a video file on disk.
#[async_trait]
pub trait VideoProber: Send + Sync {
    async fn probe(&self, path: &Path) -> ProcessingResult<ProbeResult>;
}

/// Rewrites a video so it can start playing before it is fully downloaded.
#[async_trait]
pub trait VideoTranscoder: Send + Sync {
    /// Write a fast-start copy of `input` next to it. The returned guard owns the
    /// new file and deletes it when dropped.
    async fn transcode(&self, input: &Path) -> ProcessingResult<ScopedFile>;
}
