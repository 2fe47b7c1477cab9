//! Video upload pipeline: authorize, accept, buffer, fast-start, classify, store,
//! persist.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::Multipart;
use reelhost_core::constants::{VIDEO_CONTENT_TYPE, VIDEO_FIELD_NAME};
use reelhost_core::{AppError, Video};
use reelhost_db::VideoRepository;
use reelhost_processing::{VideoProber, VideoTranscoder};
use reelhost_storage::{generate_asset_path, prefixed_key, Storage};
use tempfile::TempPath;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use super::{authorize_owner, persist};
use crate::error::multipart_error;
use crate::utils::upload::{missing_field, validate_content_type};

const TEMP_PREFIX: &str = "reelhost-upload-";

pub struct VideoUploadPipeline {
    videos: Arc<dyn VideoRepository>,
    storage: Arc<dyn Storage>,
    prober: Arc<dyn VideoProber>,
    transcoder: Arc<dyn VideoTranscoder>,
    temp_dir: PathBuf,
}

impl VideoUploadPipeline {
    pub fn new(
        videos: Arc<dyn VideoRepository>,
        storage: Arc<dyn Storage>,
        prober: Arc<dyn VideoProber>,
        transcoder: Arc<dyn VideoTranscoder>,
        temp_dir: PathBuf,
    ) -> Self {
        Self {
            videos,
            storage,
            prober,
            transcoder,
            temp_dir,
        }
    }

    /// Run the whole pipeline for one request.
    ///
    /// Ownership is checked before the body is read, so a non-owner never causes a
    /// temporary file or a storage write.
    #[tracing::instrument(skip_all, fields(video_id = %video_id, user_id = %user_id))]
    pub async fn upload(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        mut multipart: Multipart,
    ) -> Result<Video, AppError> {
        let start = Instant::now();

        let video = authorize_owner(self.videos.as_ref(), video_id, user_id).await?;
        let buffered = self.buffer_upload(&mut multipart).await?;
        let video = self.process(video, &buffered).await?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis() as u64,
            video_url = video.video_url.as_deref().unwrap_or_default(),
            "Video upload completed"
        );

        Ok(video)
    }

    /// Find the video field, check its declared type, and copy it to a temporary
    /// file. The returned path deletes the file when dropped.
    async fn buffer_upload(&self, multipart: &mut Multipart) -> Result<TempPath, AppError> {
        while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.name() != Some(VIDEO_FIELD_NAME) {
                continue;
            }

            validate_content_type(field.content_type(), &[VIDEO_CONTENT_TYPE])?;

            let (file, path) = tempfile::Builder::new()
                .prefix(TEMP_PREFIX)
                .suffix(".mp4")
                .tempfile_in(&self.temp_dir)
                .map_err(|e| AppError::storage("Couldn't create file on server", e))?
                .into_parts();
            let mut file = tokio::fs::File::from_std(file);

            let mut size_bytes: u64 = 0;
            while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                size_bytes += chunk.len() as u64;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| AppError::storage("Couldn't write file to disk", e))?;
            }
            file.flush()
                .await
                .map_err(|e| AppError::storage("Couldn't write file to disk", e))?;

            tracing::debug!(
                path = %path.display(),
                size_bytes,
                "Upload buffered to temporary file"
            );

            return Ok(path);
        }

        Err(missing_field(VIDEO_FIELD_NAME))
    }

    /// Remux, classify, store and persist an already-buffered upload.
    pub async fn process(&self, mut video: Video, buffered: &Path) -> Result<Video, AppError> {
        let prepared = self
            .transcoder
            .transcode(buffered)
            .await
            .map_err(|e| AppError::processing("Couldn't process video", e))?;

        let probe = self
            .prober
            .probe(prepared.path())
            .await
            .map_err(|e| AppError::processing("Couldn't determine video aspect ratio", e))?;

        let key = prefixed_key(
            probe.aspect_ratio.prefix(),
            &generate_asset_path(VIDEO_CONTENT_TYPE),
        );

        let url = self
            .storage
            .upload_file(&key, prepared.path(), VIDEO_CONTENT_TYPE)
            .await
            .map_err(|e| AppError::storage("Couldn't upload video", e))?;

        tracing::info!(
            video_id = %video.id,
            storage_key = %key,
            aspect_ratio = %probe.aspect_ratio,
            "Video stored"
        );

        video.video_url = Some(url);
        persist(self.videos.as_ref(), &video).await
    }
}
