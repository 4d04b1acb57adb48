//! Error types for breedid.

use crate::labels::Head;
use crate::router::Stage;

/// Result type alias for breedid operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for breedid.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// A head needed for inference has no labels.
    #[error("no {head} labels found; provide a labels list, a labels file, or train folders")]
    EmptyLabelSet {
        /// Head whose label set resolved empty.
        head: Head,
    },

    /// A head needed for inference has no model configured.
    #[error("no {head} model configured (set models.{head} in config)")]
    ModelNotConfigured {
        /// Head without a model path.
        head: Head,
    },

    /// Model file does not exist.
    #[error("{head} model file does not exist: {path}")]
    ModelFileNotFound {
        /// Head the model serves.
        head: Head,
        /// Path to the missing model file.
        path: std::path::PathBuf,
    },

    /// Failed to load a model into the runtime.
    #[error("failed to load {head} model '{path}': {reason}")]
    ModelLoad {
        /// Head the model serves.
        head: Head,
        /// Path to the model file.
        path: std::path::PathBuf,
        /// Description of the load failure.
        reason: String,
    },

    /// A model invocation failed or returned a malformed result.
    #[error("{head} model failed during {stage} stage: {reason}")]
    ModelFailure {
        /// Pipeline stage that was running.
        stage: Stage,
        /// Head whose model failed.
        head: Head,
        /// Description of the failure.
        reason: String,
    },

    /// Inference backend error, before stage context is attached.
    #[error("inference failed: {reason}")]
    Inference {
        /// Description of the inference failure.
        reason: String,
    },

    /// No valid image files found.
    #[error("no valid image files found in the provided paths")]
    NoValidImageFiles,

    /// Failed to open image file.
    #[error("failed to open image file '{path}'")]
    ImageOpen {
        /// Path to the image file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to decode image.
    #[error("failed to decode image '{path}'")]
    ImageDecode {
        /// Path to the image file.
        path: std::path::PathBuf,
        /// Underlying decode error.
        #[source]
        source: image::ImageError,
    },

    /// Correction could not be persisted.
    #[error("failed to record correction in '{path}': {reason}")]
    Persistence {
        /// Path to the ledger file.
        path: std::path::PathBuf,
        /// Description of the write failure.
        reason: String,
    },

    /// Failed to read the corrections ledger.
    #[error("failed to read corrections ledger '{path}'")]
    LedgerRead {
        /// Path to the ledger file.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Lock is held by another writer.
    #[error("file is locked by another process: {path}")]
    FileLocked {
        /// Path to the lock file.
        path: std::path::PathBuf,
    },

    /// Failed to create lock file.
    #[error("failed to create lock file '{path}'")]
    LockCreate {
        /// Path to the lock file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to remove lock file.
    #[error("failed to remove lock file '{path}'")]
    LockRemove {
        /// Path to the lock file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a CSV output file.
    #[error("failed to write CSV output file '{path}'")]
    CsvWrite {
        /// Path to the CSV file.
        path: std::path::PathBuf,
        /// Underlying CSV error.
        #[source]
        source: csv::Error,
    },

    /// Failed to write JSON output file.
    #[error("failed to write JSON output file '{path}'")]
    JsonWrite {
        /// Path to the JSON file.
        path: std::path::PathBuf,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Internal error (for unexpected failures).
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}
