use std::sync::Arc;
use std::time::SystemTime;

use axum::{extract::State, response::Json};
use tracing::info;

use crate::error::AppResult;
use crate::models::{AdapterAvailability, HealthResponse};
use crate::AppState;

/// Plain-text liveness probe at the root.
pub async fn root_handler() -> &'static str {
    "File Compressor Backend Running"
}

/// Health check endpoint reporting external tool availability.
pub async fn health_handler(State(state): State<Arc<AppState>>) -> AppResult<Json<HealthResponse>> {
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let (ghostscript, ffmpeg) = tokio::join!(
        tool_available(&state.config.ghostscript_bin, "--version"),
        tool_available(&state.config.ffmpeg_bin, "-version")
    );

    let status = if ghostscript && ffmpeg {
        "healthy"
    } else {
        "degraded"
    };

    info!(
        status = status,
        ghostscript_available = ghostscript,
        ffmpeg_available = ffmpeg,
        "Health check completed"
    );

    Ok(Json(HealthResponse {
        status: status.to_string(),
        timestamp,
        version: env!("CARGO_PKG_VERSION").to_string(),
        adapters: AdapterAvailability {
            image: true,
            pdf: ghostscript,
            video: ffmpeg,
        },
    }))
}

async fn tool_available(bin: &str, probe_arg: &str) -> bool {
    tokio::process::Command::new(bin)
        .arg(probe_arg)
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
