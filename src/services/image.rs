//! Image adapter: downscale and re-encode as JPEG with the `image` crate.

use std::io::Cursor;
use std::path::Path;

use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageOutputFormat};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::MediaKind;

pub async fn compress(input: &Path, config: &Config) -> AppResult<Vec<u8>> {
    let input = input.to_path_buf();
    let max_width = config.image_max_width;
    let quality = config.jpeg_quality;

    // Decode/encode is CPU-bound, keep it off the request task.
    tokio::task::spawn_blocking(move || encode_jpeg(&input, max_width, quality))
        .await
        .map_err(|e| AppError::internal(format!("Image task failed: {}", e)))?
}

fn encode_jpeg(input: &Path, max_width: u32, quality: u8) -> AppResult<Vec<u8>> {
    // Spooled files carry no extension, so sniff the format from the
    // content instead of the path.
    let img = ImageReader::open(input)
        .map_err(|e| {
            AppError::compression_failed(MediaKind::Image, format!("failed to open image: {}", e))
        })?
        .with_guessed_format()
        .map_err(|e| {
            AppError::compression_failed(
                MediaKind::Image,
                format!("failed to sniff image format: {}", e),
            )
        })?
        .decode()
        .map_err(|e| {
            AppError::compression_failed(MediaKind::Image, format!("failed to decode image: {}", e))
        })?;

    // Downscale only, preserving aspect ratio.
    let img = if img.width() > max_width {
        img.resize(max_width, img.height(), FilterType::Lanczos3)
    } else {
        img
    };

    // JPEG has no alpha channel.
    let img = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), ImageOutputFormat::Jpeg(quality))
        .map_err(|e| {
            AppError::compression_failed(MediaKind::Image, format!("failed to encode JPEG: {}", e))
        })?;

    Ok(out)
}
