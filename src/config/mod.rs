//! Configuration loading and management.

mod file;
mod paths;
mod types;
mod validate;

pub use file::{
    load_config, load_config_file, load_default_config, save_config, save_config_to,
};
pub use paths::{config_dir, config_file_path};
pub use types::{
    Config, CropMode, InferenceConfig, LabelSpec, LabelsConfig, LedgerConfig, ModelsConfig,
    SessionConfig,
};
pub use validate::{model_path, validate_config, validate_model_paths};
