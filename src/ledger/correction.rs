//! A single human correction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reviewer's correction of one prediction.
///
/// Identified by `(image_hash, timestamp)`. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    /// When the correction was recorded.
    pub timestamp: DateTime<Utc>,
    /// Content hash of the corrected image.
    pub image_hash: String,
    /// Label the router predicted.
    pub predicted: String,
    /// Label the reviewer assigned.
    pub actual: String,
    /// Confidence of the prediction being corrected.
    pub confidence: f32,
}

impl Correction {
    /// CSV column names, in serialization order.
    pub const COLUMNS: [&'static str; 5] =
        ["timestamp", "image_hash", "predicted", "actual", "confidence"];

    /// Create a correction stamped with the current time.
    pub fn now(
        image_hash: impl Into<String>,
        predicted: impl Into<String>,
        actual: impl Into<String>,
        confidence: f32,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            image_hash: image_hash.into(),
            predicted: predicted.into(),
            actual: actual.into(),
            confidence,
        }
    }
}
