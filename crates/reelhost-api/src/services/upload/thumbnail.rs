use std::sync::Arc;

use axum::extract::Multipart;
use reelhost_core::constants::{THUMBNAIL_CONTENT_TYPES, THUMBNAIL_FIELD_NAME};
use reelhost_core::{AppError, Video};
use reelhost_db::VideoRepository;
use reelhost_storage::{generate_asset_path, Storage};
use uuid::Uuid;

use super::{authorize_owner, persist};
use crate::error::multipart_error;
use crate::utils::upload::{missing_field, validate_content_type};

/// Thumbnail upload: authorize, accept an image, write it to the local asset
/// directory, persist the served URL.
pub struct ThumbnailUploadFlow {
    videos: Arc<dyn VideoRepository>,
    assets: Arc<dyn Storage>,
}

impl ThumbnailUploadFlow {
    pub fn new(videos: Arc<dyn VideoRepository>, assets: Arc<dyn Storage>) -> Self {
        Self { videos, assets }
    }

    #[tracing::instrument(skip_all, fields(video_id = %video_id, user_id = %user_id))]
    pub async fn upload(
        &self,
        user_id: Uuid,
        video_id: Uuid,
        mut multipart: Multipart,
    ) -> Result<Video, AppError> {
        let video = authorize_owner(self.videos.as_ref(), video_id, user_id).await?;

        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            if field.name() != Some(THUMBNAIL_FIELD_NAME) {
                continue;
            }

            let media_type = validate_content_type(field.content_type(), THUMBNAIL_CONTENT_TYPES)?;
            let data = field.bytes().await.map_err(multipart_error)?;

            return self.store(video, data.to_vec(), &media_type).await;
        }

        Err(missing_field(THUMBNAIL_FIELD_NAME))
    }

    /// Write an accepted image and point the record at it.
    pub async fn store(
        &self,
        mut video: Video,
        data: Vec<u8>,
        media_type: &str,
    ) -> Result<Video, AppError> {
        let size_bytes = data.len();
        let asset_path = generate_asset_path(media_type);

        let url = self
            .assets
            .upload_with_key(&asset_path, data, media_type)
            .await
            .map_err(|e| AppError::storage("Couldn't save thumbnail", e))?;

        tracing::info!(
            video_id = %video.id,
            asset_path = %asset_path,
            size_bytes,
            "Thumbnail stored"
        );

        video.thumbnail_url = Some(url);
        persist(self.videos.as_ref(), &video).await
    }
}
