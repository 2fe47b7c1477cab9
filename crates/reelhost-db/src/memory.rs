use crate::traits::VideoRepository;
use async_trait::async_trait;
use chrono::Utc;
use reelhost_core::{AppError, Video};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Process-local video store.
#[derive(Clone, Default)]
pub struct InMemoryVideoRepository {
    videos: Arc<Mutex<HashMap<Uuid, Video>>>,
}

impl InMemoryVideoRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Video>>, AppError> {
        self.videos
            .lock()
            .map_err(|_| AppError::Internal("video store lock poisoned".to_string()))
    }
}

#[async_trait]
impl VideoRepository for InMemoryVideoRepository {
    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        self.lock()?.insert(video.id, video.clone());
        Ok(video.clone())
    }

    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        let mut videos = self.lock()?;
        let stored = videos
            .get_mut(&video.id)
            .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))?;
        stored.thumbnail_url = video.thumbnail_url.clone();
        stored.video_url = video.video_url.clone();
        stored.updated_at = Utc::now();
        Ok(stored.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_update_only_touches_url_fields() {
        let repo = InMemoryVideoRepository::new();
        let video = repo
            .create_video(&Video::new(Uuid::new_v4(), "original title"))
            .await
            .unwrap();

        let mut changed = video.clone();
        changed.title = "renamed".to_string();
        changed.video_url = Some("https://cdn.example.com/landscape/a.mp4".to_string());
        let updated = repo.update_video(&changed).await.unwrap();

        assert_eq!(updated.title, "original title");
        assert_eq!(updated.video_url, changed.video_url);
        assert!(updated.updated_at >= video.updated_at);

        let fetched = repo.get_video(video.id).await.unwrap().unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn test_update_missing_video_is_not_found() {
        let repo = InMemoryVideoRepository::new();
        let result = repo.update_video(&Video::new(Uuid::new_v4(), "ghost")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_unknown_video_is_none() {
        let repo = InMemoryVideoRepository::new();
        assert!(repo.get_video(Uuid::new_v4()).await.unwrap().is_none());
    }
}
