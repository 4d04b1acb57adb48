//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "breedid";

/// Default square input size expected by the classifiers.
pub const DEFAULT_INPUT_SIZE: u32 = 224;

/// Default number of breed candidates reported alongside the top-1 result.
pub const DEFAULT_TOP_K: usize = 3;

/// Default maximum accepted upload size in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: f64 = 5.0;

/// Default corrections log file name.
pub const DEFAULT_LEDGER_FILE: &str = "corrections.csv";

/// Default directory holding per-head training folders for label inference.
pub const DEFAULT_DATA_DIR: &str = "hierarchical_data";

/// Species labels used when the configuration does not override them.
pub const DEFAULT_SPECIES_LABELS: [&str; 2] = ["bovine", "sheep"];

/// Confidence policy defaults.
pub mod confidence {
    /// Minimum valid confidence value.
    pub const MIN: f32 = 0.0;
    /// Maximum valid confidence value.
    pub const MAX: f32 = 1.0;
    /// Decimal places for confidence formatting.
    pub const DECIMAL_PLACES: usize = 4;

    /// Default species-stage threshold for committing to a breed head.
    pub const DEFAULT_SPECIES_THRESHOLD: f32 = 0.80;

    /// Default breed-stage threshold for accepting a breed without review.
    pub const DEFAULT_BREED_THRESHOLD: f32 = 0.70;

    /// Absolute floor below which any result requires a manual check.
    pub const MANUAL_CHECK_FLOOR: f32 = 0.50;

    /// Lower bound of the "high" confidence band.
    pub const HIGH_BAND: f32 = 0.80;
}

/// Image quality gate thresholds.
pub mod quality {
    /// Minimum acceptable shorter side in pixels.
    pub const MIN_RESOLUTION: u32 = 512;

    /// Minimum Laplacian variance for a sharp image.
    pub const MIN_LAPLACIAN_VARIANCE: f64 = 120.0;

    /// Lower bound of the acceptable brightness band.
    pub const BRIGHTNESS_LOW: f64 = 0.25;

    /// Upper bound of the acceptable brightness band.
    pub const BRIGHTNESS_HIGH: f64 = 0.75;

    /// Brightness at or above which the score saturates at 1.0.
    pub const BRIGHTNESS_MID: f64 = 0.5;

    /// Width of the brightness margin used for scoring.
    pub const BRIGHTNESS_MARGIN: f64 = 0.25;

    /// Minimum normalized intensity standard deviation.
    pub const MIN_DYNAMIC_RANGE: f64 = 0.15;
}

/// Crop assistant constants.
pub mod crop {
    /// Fraction of the shorter side kept by the center-weighted crop.
    pub const CENTER_WEIGHTED_FRACTION: f64 = 0.8;
}

/// Latency classification bounds in milliseconds.
pub mod latency {
    /// Inference faster than this is reported as good.
    pub const GOOD_MS: f64 = 300.0;
    /// Inference faster than this is reported as medium.
    pub const MEDIUM_MS: f64 = 600.0;
}

/// Correction ledger lock settings.
pub mod ledger {
    /// Lock file extension appended to the ledger path.
    pub const LOCK_FILE_EXTENSION: &str = ".lock";

    /// Number of attempts to acquire the ledger lock.
    pub const LOCK_ATTEMPTS: u32 = 50;

    /// Delay between lock attempts in milliseconds.
    pub const LOCK_RETRY_MS: u64 = 20;

    /// Age in seconds after which a leftover lock file is considered stale.
    pub const STALE_LOCK_SECS: u64 = 30;
}

/// Per-head subdirectories under the data directory used for label inference.
pub mod training_dirs {
    /// Species head training folder.
    pub const SPECIES: &str = "species";
    /// Sheep breed head training folder.
    pub const SHEEP: &str = "sheep_breeds";
    /// Bovine breed head training folder.
    pub const BOVINE: &str = "bovine_breeds";
    /// Split folder whose subdirectories name the classes.
    pub const TRAIN_SPLIT: &str = "train";
}

/// Supported input image extensions.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// UTF-8 Byte Order Mark for Excel compatibility in CSV files.
pub const UTF8_BOM: &[u8; 3] = b"\xEF\xBB\xBF";
