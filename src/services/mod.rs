pub mod compressor;
pub mod image;
pub mod pdf;
pub mod video;

pub use compressor::Compressor;

use crate::error::AppError;
use crate::models::MediaKind;

/// Translate a process-spawn failure into the kind's terminal error,
/// distinguishing a missing binary from other launch problems.
pub(crate) fn spawn_error(kind: MediaKind, bin: &str, err: std::io::Error) -> AppError {
    if err.kind() == std::io::ErrorKind::NotFound {
        AppError::compression_failed(kind, format!("{} not found on PATH", bin))
    } else {
        AppError::compression_failed(kind, format!("failed to run {}: {}", bin, err))
    }
}
