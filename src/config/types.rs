//! Configuration type definitions.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_INPUT_SIZE, DEFAULT_LEDGER_FILE, DEFAULT_MAX_FILE_SIZE_MB,
    DEFAULT_SPECIES_LABELS, DEFAULT_TOP_K, confidence,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model file locations per head.
    pub models: ModelsConfig,

    /// Label set sources per head.
    pub labels: LabelsConfig,

    /// Inference and confidence policy settings.
    pub inference: InferenceConfig,

    /// Corrections ledger settings.
    pub ledger: LedgerConfig,

    /// Session defaults.
    pub session: SessionConfig,
}

/// ONNX model paths for each classification head.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Species classifier.
    pub species: Option<PathBuf>,

    /// Sheep breed classifier.
    pub sheep: Option<PathBuf>,

    /// Bovine (cattle and buffalo) breed classifier.
    pub bovine: Option<PathBuf>,

    /// Lightweight species-only classifier used in offline mode.
    pub lite: Option<PathBuf>,
}

/// Where a head's class names come from.
///
/// In TOML this is either an inline array or a path string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LabelSpec {
    /// Explicit ordered list.
    List(Vec<String>),
    /// Path to a JSON array or a one-label-per-line text file.
    File(PathBuf),
}

/// Label set sources for the three heads.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelsConfig {
    /// Directory holding `<head>/train/<class>/` folders for label inference.
    pub data_dir: PathBuf,

    /// Species head labels.
    pub species: Option<LabelSpec>,

    /// Sheep head labels.
    pub sheep: Option<LabelSpec>,

    /// Bovine head labels.
    pub bovine: Option<LabelSpec>,
}

impl Default for LabelsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            species: Some(LabelSpec::List(
                DEFAULT_SPECIES_LABELS
                    .iter()
                    .map(ToString::to_string)
                    .collect(),
            )),
            sheep: None,
            bovine: None,
        }
    }
}

/// Framing policy applied before inference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CropMode {
    /// Use the image as uploaded.
    None,
    /// Center square crop.
    #[default]
    Center,
    /// Slightly tighter crop around the center (80% of the shorter side).
    CenterWeighted,
}

impl std::fmt::Display for CropMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Center => write!(f, "center"),
            Self::CenterWeighted => write!(f, "center-weighted"),
        }
    }
}

impl std::str::FromStr for CropMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "off" => Ok(Self::None),
            "center" => Ok(Self::Center),
            "center-weighted" | "weighted" => Ok(Self::CenterWeighted),
            other => Err(format!("unknown crop mode: {other}")),
        }
    }
}

/// Inference settings and confidence policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Square input edge length in pixels.
    pub input_size: u32,

    /// Scale pixels to `[0, 1]` instead of raw `[0, 255]`.
    pub normalize: bool,

    /// Species confidence required to route to a breed head.
    pub species_threshold: f32,

    /// Breed confidence required to accept a breed without review.
    pub breed_threshold: f32,

    /// Number of breed candidates to report.
    pub top_k: usize,

    /// Framing policy.
    pub crop: CropMode,

    /// Run both guardrail heads concurrently.
    pub parallel_guardrail: bool,

    /// Maximum accepted file size in megabytes for the quality gate.
    pub max_file_size_mb: f64,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            input_size: DEFAULT_INPUT_SIZE,
            normalize: true,
            species_threshold: confidence::DEFAULT_SPECIES_THRESHOLD,
            breed_threshold: confidence::DEFAULT_BREED_THRESHOLD,
            top_k: DEFAULT_TOP_K,
            crop: CropMode::Center,
            parallel_guardrail: true,
            max_file_size_mb: DEFAULT_MAX_FILE_SIZE_MB,
        }
    }
}

impl InferenceConfig {
    /// Maximum file size in bytes.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn max_file_size_bytes(&self) -> u64 {
        (self.max_file_size_mb.max(0.0) * 1024.0 * 1024.0) as u64
    }
}

/// Corrections ledger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Path to the append-only corrections CSV.
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LEDGER_FILE),
        }
    }
}

/// Session-level defaults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Use the lite species-only model and skip breed classification.
    pub offline: bool,

    /// Do not keep a session history of processed images.
    pub privacy: bool,
}
