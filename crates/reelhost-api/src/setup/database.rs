//! Database setup and initialization

use anyhow::Result;
use reelhost_core::Config;
use reelhost_db::{connect, run_migrations, InMemoryVideoRepository, PgVideoRepository, VideoRepository};
use std::sync::Arc;

/// Connect to Postgres and apply migrations, or fall back to an in-memory store
/// when no `DATABASE_URL` is configured.
pub async fn setup_database(config: &Config) -> Result<Arc<dyn VideoRepository>> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("DATABASE_URL not set, using in-memory video store (records are lost on restart)");
        return Ok(Arc::new(InMemoryVideoRepository::new()));
    };

    tracing::info!("Connecting to database...");
    let pool = connect(database_url, config.db_max_connections).await?;
    tracing::info!(
        max_connections = config.db_max_connections,
        "Database connected successfully"
    );

    run_migrations(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Arc::new(PgVideoRepository::new(pool)))
}
