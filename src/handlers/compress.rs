use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{savings_percent, MediaKind, Upload};
use crate::services::Compressor;
use crate::AppState;

pub async fn compress_image_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Response> {
    handle_compress(state, multipart, MediaKind::Image).await
}

pub async fn compress_pdf_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Response> {
    handle_compress(state, multipart, MediaKind::Pdf).await
}

pub async fn compress_video_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> AppResult<Response> {
    handle_compress(state, multipart, MediaKind::Video).await
}

/// Shared request flow: intake, orchestration, response. The upload's
/// temp file and the adapter's output file are both gone by the time
/// the response leaves this function.
async fn handle_compress(
    state: Arc<AppState>,
    mut multipart: Multipart,
    kind: MediaKind,
) -> AppResult<Response> {
    let start = Instant::now();
    let request_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

    info!(request_id = %request_id, kind = kind.label(), "Starting compression request");

    let upload = match receive_upload(&mut multipart, kind, &state.config).await {
        Ok(upload) => {
            info!(
                request_id = %request_id,
                file_name = %upload.name,
                file_size = upload.size,
                "Upload spooled to scratch directory"
            );
            upload
        }
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "Upload rejected");
            return Err(e);
        }
    };

    let compressor = Compressor::new(&state.config);
    let result = match compressor.compress(&upload).await {
        Ok(result) => result,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "Compression failed");
            return Err(e);
        }
    };

    info!(
        request_id = %request_id,
        original_bytes = upload.size,
        compressed_bytes = result.size(),
        saved_percent = savings_percent(upload.size, result.size()),
        total_time_ms = start.elapsed().as_millis() as u64,
        "Request completed successfully"
    );

    Ok(([(header::CONTENT_TYPE, result.content_type())], result.data).into_response())
}

/// Pull the single `file` field out of the multipart body, classify it
/// and spool it. Classification happens before any file is created, so
/// a rejected request leaves nothing in the scratch directory.
async fn receive_upload(
    multipart: &mut Multipart,
    kind: MediaKind,
    config: &Config,
) -> AppResult<Upload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidMultipart {
            message: format!("Failed to read multipart field: {}", e),
        })?
    {
        if field.name().unwrap_or("") != "file" {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(|ct| ct.to_string());

        match MediaKind::classify(content_type.as_deref(), &file_name) {
            Some(declared) if declared == kind => {}
            _ => {
                return Err(AppError::UnsupportedMediaType {
                    content_type: content_type.unwrap_or_else(|| file_name.clone()),
                })
            }
        }

        let data = field.bytes().await.map_err(|e| AppError::InvalidMultipart {
            message: format!("Failed to read file data: {}", e),
        })?;

        if data.is_empty() {
            return Err(AppError::MissingFile);
        }

        let max_size_bytes = config.max_file_size_mb * 1024 * 1024;
        if data.len() > max_size_bytes {
            return Err(AppError::FileTooLarge {
                size: data.len() / (1024 * 1024),
                limit: config.max_file_size_mb,
            });
        }

        return Upload::spool(file_name, kind, &data, &config.scratch_dir);
    }

    Err(AppError::MissingFile)
}
