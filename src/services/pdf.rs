//! PDF adapter: re-distill through Ghostscript's pdfwrite device.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::MediaKind;
use crate::services::spawn_error;

pub async fn distill(input: &Path, config: &Config) -> AppResult<Vec<u8>> {
    let output = tempfile::Builder::new()
        .prefix("compressed-")
        .suffix(".pdf")
        .tempfile_in(&config.scratch_dir)?;

    let result = Command::new(&config.ghostscript_bin)
        .arg("-sDEVICE=pdfwrite")
        .arg("-dCompatibilityLevel=1.4")
        .arg(format!("-dPDFSETTINGS=/{}", config.pdf_preset))
        .arg("-dNOPAUSE")
        .arg("-dQUIET")
        .arg("-dBATCH")
        .arg(format!("-sOutputFile={}", output.path().display()))
        .arg(input)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| spawn_error(MediaKind::Pdf, &config.ghostscript_bin, e))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(AppError::compression_failed(
            MediaKind::Pdf,
            format!(
                "{} exited with {}: {}",
                config.ghostscript_bin,
                result.status,
                stderr.trim()
            ),
        ));
    }

    let data = tokio::fs::read(output.path()).await.map_err(|e| {
        AppError::compression_failed(MediaKind::Pdf, format!("failed to read output: {}", e))
    })?;

    if data.is_empty() {
        return Err(AppError::compression_failed(
            MediaKind::Pdf,
            "ghostscript produced no output",
        ));
    }

    Ok(data)
}
