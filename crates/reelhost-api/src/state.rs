//! Application state shared by all handlers.

use crate::auth::IdentityResolver;
use crate::services::upload::{ThumbnailUploadFlow, VideoUploadPipeline};
use reelhost_db::VideoRepository;
use std::sync::Arc;

/// The two upload flows, built once at startup.
#[derive(Clone)]
pub struct UploadState {
    pub video: Arc<VideoUploadPipeline>,
    pub thumbnail: Arc<ThumbnailUploadFlow>,
}

#[derive(Clone)]
pub struct AppState {
    pub videos: Arc<dyn VideoRepository>,
    pub identity: Arc<dyn IdentityResolver>,
    pub uploads: UploadState,
}
