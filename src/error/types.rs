use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::MediaKind;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Unsupported media type: {content_type}")]
    UnsupportedMediaType { content_type: String },

    #[error("Missing file in request")]
    MissingFile,

    #[error("File too large: {size}MB exceeds limit of {limit}MB")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Invalid multipart request: {message}")]
    InvalidMultipart { message: String },

    // Display is the wire contract: a fixed type-specific message,
    // the underlying tool detail goes to the log only.
    #[error("{}", .kind.failure_message())]
    CompressionFailed { kind: MediaKind, detail: String },

    #[error("{} timed out", .kind.label())]
    CompressionTimeout { kind: MediaKind },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::UnsupportedMediaType { .. } => "UNSUPPORTED_MEDIA_TYPE",
            AppError::MissingFile => "MISSING_FILE",
            AppError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            AppError::InvalidMultipart { .. } => "INVALID_MULTIPART",
            AppError::CompressionFailed { .. } => "COMPRESSION_FAILED",
            AppError::CompressionTimeout { .. } => "COMPRESSION_TIMEOUT",
            AppError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            AppError::MissingFile => StatusCode::BAD_REQUEST,
            AppError::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::InvalidMultipart { .. } => StatusCode::BAD_REQUEST,
            AppError::CompressionFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::CompressionTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn compression_failed(kind: MediaKind, detail: impl Into<String>) -> Self {
        AppError::CompressionFailed {
            kind,
            detail: detail.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal {
            message: message.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        tracing::error!(
            error_code = error_code,
            status_code = %status,
            error_detail = ?self,
            "Request failed"
        );

        let body = Json(json!({
            "error": message,
            "code": error_code,
        }));

        (status, body).into_response()
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal {
            message: err.to_string(),
        }
    }
}
