//! Wiring of collaborators into [`AppState`].

use anyhow::{Context, Result};
use reelhost_core::Config;
use reelhost_db::VideoRepository;
use reelhost_processing::{FfmpegFastStart, FfprobeProber};
use std::sync::Arc;

use super::storage::StorageSetup;
use crate::auth::JwtIdentityResolver;
use crate::services::upload::{ThumbnailUploadFlow, VideoUploadPipeline};
use crate::state::{AppState, UploadState};

pub async fn initialize_services(
    config: &Config,
    videos: Arc<dyn VideoRepository>,
    storage: StorageSetup,
) -> Result<Arc<AppState>> {
    let prober = FfprobeProber::new(config.ffprobe_path.clone()).context("Invalid FFPROBE_PATH")?;
    let transcoder =
        FfmpegFastStart::new(config.ffmpeg_path.clone()).context("Invalid FFMPEG_PATH")?;

    tokio::fs::create_dir_all(&config.upload_temp_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload temp dir {}",
                config.upload_temp_dir.display()
            )
        })?;

    let video = VideoUploadPipeline::new(
        videos.clone(),
        storage.videos,
        Arc::new(prober),
        Arc::new(transcoder),
        config.upload_temp_dir.clone(),
    );
    let thumbnail = ThumbnailUploadFlow::new(videos.clone(), storage.assets);

    Ok(Arc::new(AppState {
        videos,
        identity: Arc::new(JwtIdentityResolver::new(&config.jwt_secret)),
        uploads: UploadState {
            video: Arc::new(video),
            thumbnail: Arc::new(thumbnail),
        },
    }))
}
