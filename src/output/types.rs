//! Output type definitions.

use crate::router::InferenceResult;
use serde::Serialize;
use std::path::PathBuf;

/// A routed result for one image file.
#[derive(Debug, Clone, Serialize)]
pub struct ImageRecord {
    /// Path to the source image.
    pub file_path: PathBuf,
    /// Content hash of the decoded image.
    pub image_hash: String,
    /// Size of the encoded file in bytes.
    pub file_size_bytes: u64,
    /// Router output.
    pub result: InferenceResult,
}

impl ImageRecord {
    /// File name for display, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.file_path.file_name().map_or_else(
            || self.file_path.display().to_string(),
            |n| n.to_string_lossy().into_owned(),
        )
    }
}
