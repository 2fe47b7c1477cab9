//! Test helpers: build AppState and router for integration tests.
//!
//! Everything runs in-process: in-memory video records, a recording fake for the
//! durable store, a real local asset directory and fake media tools.

#![allow(dead_code)]

pub mod fakes;

use axum_test::TestServer;
use chrono::Duration;
use reelhost_api::auth::JwtIdentityResolver;
use reelhost_api::services::upload::{ThumbnailUploadFlow, VideoUploadPipeline};
use reelhost_api::setup::routes;
use reelhost_api::state::{AppState, UploadState};
use reelhost_core::{Config, StorageBackend, Video};
use reelhost_db::{InMemoryVideoRepository, VideoRepository};
use reelhost_processing::VideoTranscoder;
use reelhost_storage::LocalStorage;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use fakes::{FailingUpdateRepository, FakeProber, FakeTranscoder, RecordingStorage};

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";
pub const PUBLIC_BASE_URL: &str = "http://localhost:8091";
pub const MAX_THUMBNAIL_SIZE_BYTES: usize = 16 * 1024;
pub const MAX_VIDEO_SIZE_BYTES: usize = 1024 * 1024;

pub struct TestApp {
    pub server: TestServer,
    pub repo: Arc<InMemoryVideoRepository>,
    pub storage: Arc<RecordingStorage>,
    pub tokens: JwtIdentityResolver,
    pub upload_dir: TempDir,
    pub assets_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Insert a record owned by `owner`.
    pub async fn create_video(&self, owner: Uuid) -> Video {
        self.repo
            .create_video(&Video::new(owner, "Boot.dev beats"))
            .await
            .unwrap()
    }

    pub async fn stored_video(&self, id: Uuid) -> Video {
        self.repo.get_video(id).await.unwrap().unwrap()
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        self.tokens.issue(user_id, Duration::hours(1)).unwrap()
    }

    pub fn bearer(&self, user_id: Uuid) -> String {
        format!("Bearer {}", self.token_for(user_id))
    }

    /// Files left behind in the upload scratch directory.
    pub fn leftover_temp_files(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.upload_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }
}

pub fn test_config(upload_dir: &TempDir, assets_dir: &TempDir) -> Config {
    Config {
        server_port: 8091,
        environment: "test".to_string(),
        cors_origins: vec!["*".to_string()],
        jwt_secret: JWT_SECRET.to_string(),
        database_url: None,
        db_max_connections: 1,
        storage_backend: StorageBackend::S3,
        s3_bucket: Some("reelhost-test".to_string()),
        s3_region: Some("us-east-1".to_string()),
        s3_endpoint: None,
        s3_cf_distribution: Some("cdn.example.com".to_string()),
        assets_root: assets_dir.path().to_path_buf(),
        public_base_url: PUBLIC_BASE_URL.to_string(),
        upload_temp_dir: upload_dir.path().to_path_buf(),
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        max_video_size_bytes: MAX_VIDEO_SIZE_BYTES,
        max_thumbnail_size_bytes: MAX_THUMBNAIL_SIZE_BYTES,
    }
}

/// Collaborators swapped in for a test app.
pub struct TestAppOptions {
    /// Reported by the prober; `None` makes probing fail.
    pub display_aspect_ratio: Option<&'static str>,
    pub transcoder: Arc<dyn VideoTranscoder>,
    /// Make every record update fail after the read succeeds.
    pub fail_record_updates: bool,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            display_aspect_ratio: Some("16:9"),
            transcoder: Arc::new(FakeTranscoder),
            fail_record_updates: false,
        }
    }
}

/// Build the app with a prober that reports `display_aspect_ratio`, or fails when
/// it is `None`.
pub async fn setup_test_app(display_aspect_ratio: Option<&'static str>) -> TestApp {
    setup_test_app_with(TestAppOptions {
        display_aspect_ratio,
        ..Default::default()
    })
    .await
}

pub async fn setup_test_app_with(options: TestAppOptions) -> TestApp {
    let upload_dir = tempfile::tempdir().unwrap();
    let assets_dir = tempfile::tempdir().unwrap();
    let config = test_config(&upload_dir, &assets_dir);

    let repo = Arc::new(InMemoryVideoRepository::new());
    let videos: Arc<dyn VideoRepository> = if options.fail_record_updates {
        Arc::new(FailingUpdateRepository(repo.clone()))
    } else {
        repo.clone()
    };
    let storage = Arc::new(RecordingStorage::default());
    let assets = LocalStorage::new(config.assets_root.clone(), config.assets_base_url())
        .await
        .unwrap();

    let video = VideoUploadPipeline::new(
        videos.clone(),
        storage.clone(),
        Arc::new(FakeProber {
            display_aspect_ratio: options.display_aspect_ratio,
        }),
        options.transcoder,
        config.upload_temp_dir.clone(),
    );
    let thumbnail = ThumbnailUploadFlow::new(videos.clone(), Arc::new(assets));

    let state = Arc::new(AppState {
        videos,
        identity: Arc::new(JwtIdentityResolver::new(JWT_SECRET)),
        uploads: UploadState {
            video: Arc::new(video),
            thumbnail: Arc::new(thumbnail),
        },
    });

    let router = routes::setup_routes(&config, state).expect("routes");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        repo,
        storage,
        tokens: JwtIdentityResolver::new(JWT_SECRET),
        upload_dir,
        assets_dir,
    }
}
