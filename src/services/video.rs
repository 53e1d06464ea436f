//! Video adapter: transcode to H.264 MP4 with ffmpeg.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::MediaKind;
use crate::services::spawn_error;

pub async fn transcode(input: &Path, config: &Config) -> AppResult<Vec<u8>> {
    let output = tempfile::Builder::new()
        .prefix("compressed-")
        .suffix(".mp4")
        .tempfile_in(&config.scratch_dir)?;

    // scale=<w>:-2 keeps the aspect ratio with an even height, which
    // libx264 requires.
    let result = Command::new(&config.ffmpeg_bin)
        .arg("-y")
        .arg("-i")
        .arg(input)
        .arg("-vcodec")
        .arg("libx264")
        .arg("-vf")
        .arg(format!("scale={}:-2", config.video_max_width))
        .arg("-crf")
        .arg(config.video_crf.to_string())
        .arg("-f")
        .arg("mp4")
        .arg(output.path())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| spawn_error(MediaKind::Video, &config.ffmpeg_bin, e))?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr);
        return Err(AppError::compression_failed(
            MediaKind::Video,
            format!(
                "{} exited with {}: {}",
                config.ffmpeg_bin,
                result.status,
                last_lines(&stderr, 5)
            ),
        ));
    }

    let data = tokio::fs::read(output.path()).await.map_err(|e| {
        AppError::compression_failed(MediaKind::Video, format!("failed to read output: {}", e))
    })?;

    if data.is_empty() {
        return Err(AppError::compression_failed(
            MediaKind::Video,
            "ffmpeg produced no output",
        ));
    }

    Ok(data)
}

// ffmpeg's stderr is mostly a banner; keep the tail where the actual
// error lives.
fn last_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}
