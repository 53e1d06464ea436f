use bytes::Bytes;

use crate::models::MediaKind;

/// The output artifact of one compression job, fully read into memory.
/// By the time one of these exists, the adapter's temp files are gone.
#[derive(Debug)]
pub struct CompressedResult {
    pub data: Bytes,
    pub kind: MediaKind,
}

impl CompressedResult {
    pub fn new(data: impl Into<Bytes>, kind: MediaKind) -> Self {
        Self {
            data: data.into(),
            kind,
        }
    }

    pub fn content_type(&self) -> &'static str {
        self.kind.output_content_type()
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Percentage saved by compression, rounded to the nearest integer.
/// Negative when the output grew; 0 when the original size is unknown.
pub fn savings_percent(original: usize, compressed: usize) -> i64 {
    if original == 0 {
        return 0;
    }
    ((1.0 - compressed as f64 / original as f64) * 100.0).round() as i64
}
