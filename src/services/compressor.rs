use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{CompressedResult, MediaKind, Upload};
use crate::services::{image, pdf, video};

/// Dispatches a spooled upload to the adapter for its media kind and
/// bounds the adapter's runtime.
///
/// Each upload is handled exactly once; a failed adapter run is
/// terminal for the request, there is no retry.
pub struct Compressor<'a> {
    config: &'a Config,
}

impl<'a> Compressor<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub async fn compress(&self, upload: &Upload) -> AppResult<CompressedResult> {
        let kind = upload.kind;
        let deadline = Duration::from_secs(self.config.tool_timeout_seconds);

        debug!(
            kind = kind.label(),
            input = %upload.path().display(),
            timeout_seconds = self.config.tool_timeout_seconds,
            "Dispatching compression job"
        );

        // External children are spawned with kill_on_drop, so hitting
        // the deadline also terminates the stalled tool.
        let work = async {
            match kind {
                MediaKind::Image => image::compress(upload.path(), self.config).await,
                MediaKind::Pdf => pdf::distill(upload.path(), self.config).await,
                MediaKind::Video => video::transcode(upload.path(), self.config).await,
            }
        };

        let data = tokio::time::timeout(deadline, work)
            .await
            .map_err(|_| AppError::CompressionTimeout { kind })??;

        Ok(CompressedResult::new(data, kind))
    }
}
