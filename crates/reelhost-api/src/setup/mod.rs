//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use reelhost_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: &Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.is_production())
        .context("Failed to initialize telemetry")?;

    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;
    tracing::info!(environment = %config.environment, "Configuration loaded and validated successfully");

    let videos = database::setup_database(config).await?;
    let storage = storage::setup_storage(config).await?;
    let state = services::initialize_services(config, videos, storage).await?;
    let router = routes::setup_routes(config, state.clone())?;

    Ok((state, router))
}
