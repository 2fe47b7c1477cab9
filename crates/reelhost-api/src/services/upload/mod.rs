//! Upload flows
//!
//! Both flows start by authorizing the caller against the target record, then read
//! exactly one named multipart field. The video pipeline buffers, remuxes, probes
//! and stores; the thumbnail flow writes straight to the local asset directory.

pub mod thumbnail;
pub mod video;

pub use thumbnail::ThumbnailUploadFlow;
pub use video::VideoUploadPipeline;

use reelhost_core::{AppError, Video};
use reelhost_db::VideoRepository;
use uuid::Uuid;

/// Fetch the record and check that `user_id` owns it.
pub async fn authorize_owner(
    videos: &dyn VideoRepository,
    video_id: Uuid,
    user_id: Uuid,
) -> Result<Video, AppError> {
    let video = videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;

    if !video.is_owned_by(user_id) {
        tracing::warn!(
            video_id = %video_id,
            user_id = %user_id,
            owner_id = %video.user_id,
            "Upload attempted by non-owner"
        );
        return Err(AppError::Forbidden("Not authorized to update this video".to_string()));
    }

    Ok(video)
}

/// Persist the URL fields of `video`. A vanished record stays a 404; any other
/// failure is a storage error.
pub(crate) async fn persist(videos: &dyn VideoRepository, video: &Video) -> Result<Video, AppError> {
    match videos.update_video(video).await {
        Ok(updated) => Ok(updated),
        Err(e @ AppError::NotFound(_)) => Err(e),
        Err(e) => Err(AppError::storage("Couldn't update video", e)),
    }
}
