//! Squish file compression service
//!
//! A small Rust service that accepts image, PDF and video uploads and
//! shrinks them by delegating to the right tool for the media type:
//! the `image` crate for raster images, Ghostscript for PDFs and
//! ffmpeg for video.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, AppResult};

/// Shared per-process state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Config,
}

/// Build the application router around the given configuration.
pub fn app(config: Config) -> Router {
    // One extra megabyte of headroom over the per-file limit, so an
    // oversize upload reaches the explicit size check (413) instead of
    // dying inside multipart body framing (400).
    let body_limit = (config.max_file_size_mb + 1) * 1024 * 1024;
    let state = Arc::new(AppState { config });

    Router::new()
        .route("/", get(handlers::root_handler))
        .route("/health", get(handlers::health_handler))
        .route("/app", get(handlers::ui_handler))
        .route("/compress/image", post(handlers::compress_image_handler))
        .route("/compress/pdf", post(handlers::compress_pdf_handler))
        .route("/compress/video", post(handlers::compress_video_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(axum::middleware::from_fn(
                    middleware::logging::logging_middleware,
                )),
        )
        .with_state(state)
}
