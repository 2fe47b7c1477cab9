//! Configuration module
//!
//! All runtime settings are read once at boot into [`Config`] and handed to each
//! component at construction. Nothing reads the environment after startup.

use std::env;
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 8091;
const MAX_CONNECTIONS: u32 = 10;
const MAX_VIDEO_SIZE_MB: usize = 1024;
const MAX_THUMBNAIL_SIZE_MB: usize = 10;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    /// When unset the API falls back to an in-memory video store.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    // Video storage
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    /// CDN host fronting the bucket, e.g. `d111111abcdef8.cloudfront.net`.
    pub s3_cf_distribution: Option<String>,
    // Local assets
    pub assets_root: PathBuf,
    pub public_base_url: String,
    pub upload_temp_dir: PathBuf,
    // External tools
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    // Limits
    pub max_video_size_bytes: usize,
    pub max_thumbnail_size_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let server_port: u16 = env::var("PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(raw) => raw.parse()?,
            Err(_) => StorageBackend::S3,
        };

        let max_video_size_bytes = size_limit_bytes(
            "MAX_VIDEO_SIZE_MB",
            env::var("MAX_VIDEO_SIZE_MB").ok(),
            MAX_VIDEO_SIZE_MB,
        )?;
        let max_thumbnail_size_bytes = size_limit_bytes(
            "MAX_THUMBNAIL_SIZE_MB",
            env::var("MAX_THUMBNAIL_SIZE_MB").ok(),
            MAX_THUMBNAIL_SIZE_MB,
        )?;

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", server_port))
            .trim_end_matches('/')
            .to_string();

        Ok(Config {
            server_port,
            environment,
            cors_origins,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            database_url: env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            storage_backend,
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION")
                .or_else(|_| env::var("AWS_REGION"))
                .ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            s3_cf_distribution: env::var("S3_CF_DISTRIBUTION").ok().filter(|s| !s.is_empty()),
            assets_root: env::var("ASSETS_ROOT")
                .unwrap_or_else(|_| "./assets".to_string())
                .into(),
            public_base_url,
            upload_temp_dir: env::var("UPLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            max_video_size_bytes,
            max_thumbnail_size_bytes,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    /// Base URL under which files in `assets_root` are reachable.
    pub fn assets_base_url(&self) -> String {
        format!(
            "{}{}",
            self.public_base_url.trim_end_matches('/'),
            crate::constants::ASSETS_ROUTE
        )
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if let Some(ref url) = self.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        if self.max_video_size_bytes == 0 || self.max_thumbnail_size_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size limits must be greater than zero"));
        }

        if self.storage_backend == StorageBackend::S3 {
            if self.s3_bucket.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_BUCKET must be set when using S3 storage backend"
                ));
            }
            if self.s3_region.is_none() {
                return Err(anyhow::anyhow!(
                    "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                ));
            }
        }

        Ok(())
    }
}

/// Parse a megabyte limit into bytes, using `default_mb` when unset.
fn size_limit_bytes(
    name: &str,
    raw: Option<String>,
    default_mb: usize,
) -> Result<usize, anyhow::Error> {
    let mb = match raw {
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number", name))?,
        None => default_mb,
    };

    mb.checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("{} is too large", name))
}
