use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::AppResult;

/// The closed set of media types the service knows how to compress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Pdf,
    Video,
}

impl MediaKind {
    /// Map a declared content type (with the file name as fallback) onto
    /// a supported kind. Returns `None` for anything outside the set
    /// {image/*, application/pdf, video/mp4}.
    pub fn classify(content_type: Option<&str>, file_name: &str) -> Option<Self> {
        if let Some(ct) = content_type {
            let ct = ct.trim().to_ascii_lowercase();
            if ct.starts_with("image/") {
                return Some(MediaKind::Image);
            }
            if ct == "application/pdf" {
                return Some(MediaKind::Pdf);
            }
            if ct == "video/mp4" {
                return Some(MediaKind::Video);
            }
            // A declared but unrecognized type is a rejection, not a
            // cue to guess from the file name.
            return None;
        }

        match Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") | Some("png") | Some("gif") | Some("webp")
            | Some("bmp") => Some(MediaKind::Image),
            Some("pdf") => Some(MediaKind::Pdf),
            Some("mp4") => Some(MediaKind::Video),
            _ => None,
        }
    }

    /// Content type of the compressed output for this kind.
    pub fn output_content_type(self) -> &'static str {
        match self {
            MediaKind::Image => "image/jpeg",
            MediaKind::Pdf => "application/pdf",
            MediaKind::Video => "video/mp4",
        }
    }

    /// The user-facing failure message for this kind's endpoint.
    pub fn failure_message(self) -> &'static str {
        match self {
            MediaKind::Image => "Compression failed",
            MediaKind::Pdf => "PDF compression failed",
            MediaKind::Video => "Video compression failed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaKind::Image => "Image compression",
            MediaKind::Pdf => "PDF compression",
            MediaKind::Video => "Video compression",
        }
    }
}

/// One request's input artifact, spooled to the scratch directory.
///
/// The backing temp file is deleted when the `Upload` is dropped, so
/// cleanup happens on every exit path, including adapter failures.
#[derive(Debug)]
pub struct Upload {
    pub name: String,
    pub size: usize,
    pub kind: MediaKind,
    file: NamedTempFile,
}

impl Upload {
    /// Persist the received bytes under a unique name in the scratch
    /// directory.
    pub fn spool(
        name: impl Into<String>,
        kind: MediaKind,
        data: &[u8],
        scratch_dir: &Path,
    ) -> AppResult<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(scratch_dir)?;
        file.write_all(data)?;
        file.flush()?;

        Ok(Upload {
            name: name.into(),
            size: data.len(),
            kind,
            file,
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}
