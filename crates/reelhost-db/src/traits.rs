use async_trait::async_trait;
use reelhost_core::{AppError, Video};
use uuid::Uuid;

/// Store of video records keyed by id.
///
/// Updates are last-write-wins; callers do not get compare-and-swap semantics.
#[async_trait]
pub trait VideoRepository: Send + Sync {
    async fn create_video(&self, video: &Video) -> Result<Video, AppError>;

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Persist the URL fields of `video`. Returns the stored record, or
    /// `AppError::NotFound` when no record has that id.
    async fn update_video(&self, video: &Video) -> Result<Video, AppError>;
}
