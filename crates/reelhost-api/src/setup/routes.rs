//! Route configuration and setup

use crate::auth::auth_middleware;
use crate::handlers;
use crate::middleware::request_id_middleware;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use reelhost_core::constants::ASSETS_ROUTE;
use reelhost_core::Config;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Multipart framing on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;

    let video_limit = config.max_video_size_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES);
    let thumbnail_limit = config
        .max_thumbnail_size_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    // Auth runs before any extractor, so a bad token wins over a bad path or body
    let protected_routes = Router::new()
        .route(
            "/api/video_upload/{video_id}",
            post(handlers::video_upload::upload_video).layer(DefaultBodyLimit::max(video_limit)),
        )
        .route(
            "/api/thumbnail_upload/{video_id}",
            post(handlers::thumbnail_upload::upload_thumbnail)
                .layer(DefaultBodyLimit::max(thumbnail_limit)),
        )
        .route("/api/videos/{video_id}", get(handlers::video_get::get_video))
        .route_layer(axum::middleware::from_fn_with_state(
            state.identity.clone(),
            auth_middleware,
        ));

    let public_routes = Router::new().route("/api/healthz", get(handlers::health::health_check));

    let app = public_routes
        .merge(protected_routes)
        .nest_service(ASSETS_ROUTE, ServeDir::new(&config.assets_root))
        .layer(RequestBodyLimitLayer::new(video_limit.max(thumbnail_limit)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|_| anyhow::anyhow!("Invalid CORS origin: {}", o))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };

    Ok(cors)
}
