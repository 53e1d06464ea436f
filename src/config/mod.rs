use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_file_size_mb: usize,
    pub scratch_dir: PathBuf,
    pub tool_timeout_seconds: u64,
    pub ghostscript_bin: String,
    pub ffmpeg_bin: String,
    pub image_max_width: u32,
    pub jpeg_quality: u8,
    pub video_max_width: u32,
    pub video_crf: u8,
    pub pdf_preset: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| {
                info!("SERVER_HOST not set, using default: 0.0.0.0");
                "0.0.0.0".to_string()
            }),
            server_port: Self::parse_env_var("SERVER_PORT", 5000)
                .context("Failed to parse SERVER_PORT")?,
            max_file_size_mb: Self::parse_env_var("MAX_FILE_SIZE_MB", 100)
                .context("Failed to parse MAX_FILE_SIZE_MB")?,
            scratch_dir: env::var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    info!("SCRATCH_DIR not set, using default: uploads");
                    PathBuf::from("uploads")
                }),
            tool_timeout_seconds: Self::parse_env_var("TOOL_TIMEOUT_SECONDS", 120)
                .context("Failed to parse TOOL_TIMEOUT_SECONDS")?,
            ghostscript_bin: env::var("GHOSTSCRIPT_BIN").unwrap_or_else(|_| "gs".to_string()),
            ffmpeg_bin: env::var("FFMPEG_BIN").unwrap_or_else(|_| "ffmpeg".to_string()),
            image_max_width: Self::parse_env_var("IMAGE_MAX_WIDTH", 800)
                .context("Failed to parse IMAGE_MAX_WIDTH")?,
            jpeg_quality: Self::parse_env_var("JPEG_QUALITY", 60)
                .context("Failed to parse JPEG_QUALITY")?,
            video_max_width: Self::parse_env_var("VIDEO_MAX_WIDTH", 640)
                .context("Failed to parse VIDEO_MAX_WIDTH")?,
            video_crf: Self::parse_env_var("VIDEO_CRF", 28).context("Failed to parse VIDEO_CRF")?,
            pdf_preset: env::var("PDF_PRESET").unwrap_or_else(|_| "ebook".to_string()),
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!(
                        "Failed to parse {}: {} (using default: {:?})",
                        var_name, e, default
                    );
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_file_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.tool_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("TOOL_TIMEOUT_SECONDS must be greater than 0"));
        }
        if self.image_max_width == 0 {
            return Err(anyhow::anyhow!("IMAGE_MAX_WIDTH must be greater than 0"));
        }
        if self.jpeg_quality == 0 || self.jpeg_quality > 100 {
            return Err(anyhow::anyhow!("JPEG_QUALITY must be between 1 and 100"));
        }
        if self.video_max_width == 0 {
            return Err(anyhow::anyhow!("VIDEO_MAX_WIDTH must be greater than 0"));
        }
        if self.video_crf > 51 {
            return Err(anyhow::anyhow!("VIDEO_CRF must be between 0 and 51"));
        }
        if self.pdf_preset.is_empty() {
            return Err(anyhow::anyhow!("PDF_PRESET must not be empty"));
        }
        Ok(())
    }

    /// Create the scratch directory if it does not exist yet.
    pub fn ensure_scratch_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.scratch_dir).with_context(|| {
            format!(
                "Failed to create scratch directory {}",
                self.scratch_dir.display()
            )
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: "0.0.0.0".to_string(),
            server_port: 5000,
            max_file_size_mb: 100,
            scratch_dir: PathBuf::from("uploads"),
            tool_timeout_seconds: 120,
            ghostscript_bin: "gs".to_string(),
            ffmpeg_bin: "ffmpeg".to_string(),
            image_max_width: 800,
            jpeg_quality: 60,
            video_max_width: 640,
            video_crf: 28,
            pdf_preset: "ebook".to_string(),
        }
    }
}
