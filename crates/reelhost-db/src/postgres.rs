use crate::traits::VideoRepository;
use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelhost_core::{AppError, Video};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};
use std::time::Duration;
use uuid::Uuid;

/// Open a connection pool against `database_url`.
pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Apply the bundled migrations.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")
}

/// Row type for the videos table.
#[derive(Debug, sqlx::FromRow)]
struct VideoRow {
    id: Uuid,
    user_id: Uuid,
    title: String,
    description: Option<String>,
    thumbnail_url: Option<String>,
    video_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VideoRow> for Video {
    fn from(row: VideoRow) -> Self {
        Video {
            id: row.id,
            user_id: row.user_id,
            title: row.title,
            description: row.description,
            thumbnail_url: row.thumbnail_url,
            video_url: row.video_url,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for the videos table.
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self, video), fields(db.table = "videos", video_id = %video.id))]
    async fn create_video(&self, video: &Video) -> Result<Video, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            INSERT INTO videos (id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at
            "#,
        )
        .bind(video.id)
        .bind(video.user_id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(video.created_at)
        .bind(video.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    #[tracing::instrument(skip(self), fields(db.table = "videos"))]
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            SELECT id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Video::from))
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", video_id = %video.id))]
    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        let row = sqlx::query_as::<Postgres, VideoRow>(
            r#"
            UPDATE videos
            SET thumbnail_url = $2, video_url = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING id, user_id, title, description, thumbnail_url, video_url, created_at, updated_at
            "#,
        )
        .bind(video.id)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Video::from)
            .ok_or_else(|| AppError::NotFound("Couldn't find video".to_string()))
    }
}
