//! Configuration validation.

use crate::config::Config;
use crate::constants::confidence;
use crate::error::{Error, Result};
use crate::labels::Head;
use std::path::Path;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_inference(config)?;
    Ok(())
}

/// Validate inference settings and confidence policy.
fn validate_inference(config: &Config) -> Result<()> {
    let inference = &config.inference;

    for (name, value) in [
        ("species_threshold", inference.species_threshold),
        ("breed_threshold", inference.breed_threshold),
    ] {
        if !(confidence::MIN..=confidence::MAX).contains(&value) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "{name} must be between {} and {}, got {value}",
                    confidence::MIN,
                    confidence::MAX,
                ),
            });
        }
    }

    if inference.input_size == 0 {
        return Err(Error::ConfigValidation {
            message: "input_size must be at least 1".to_string(),
        });
    }

    if inference.top_k == 0 {
        return Err(Error::ConfigValidation {
            message: "top_k must be at least 1".to_string(),
        });
    }

    if !inference.max_file_size_mb.is_finite() || inference.max_file_size_mb <= 0.0 {
        return Err(Error::ConfigValidation {
            message: format!(
                "max_file_size_mb must be positive, got {}",
                inference.max_file_size_mb
            ),
        });
    }

    Ok(())
}

/// Resolve the model path configured for a head.
///
/// `lite` selects the offline species-only model for the species head.
pub fn model_path(config: &Config, head: Head, lite: bool) -> Result<&Path> {
    let models = &config.models;
    let configured = match head {
        Head::Species if lite => models.lite.as_deref(),
        Head::Species => models.species.as_deref(),
        Head::Sheep => models.sheep.as_deref(),
        Head::Bovine => models.bovine.as_deref(),
    };

    let path = configured.ok_or(Error::ModelNotConfigured { head })?;
    if !path.exists() {
        return Err(Error::ModelFileNotFound {
            head,
            path: path.to_path_buf(),
        });
    }
    Ok(path)
}

/// Check that every model the session needs is configured and present.
pub fn validate_model_paths(config: &Config, offline: bool) -> Result<()> {
    if offline {
        model_path(config, Head::Species, true)?;
        return Ok(());
    }
    for head in Head::ALL {
        model_path(config, head, false)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_invalid_species_threshold() {
        let mut config = Config::default();
        config.inference.species_threshold = 1.5;
        assert!(matches!(
            validate_config(&config),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[test]
    fn test_validate_negative_breed_threshold() {
        let mut config = Config::default();
        config.inference.breed_threshold = -0.1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_top_k() {
        let mut config = Config::default();
        config.inference.top_k = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_input_size() {
        let mut config = Config::default();
        config.inference.input_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_model_path_not_configured() {
        let config = Config::default();
        let result = model_path(&config, Head::Sheep, false);
        assert!(matches!(
            result,
            Err(Error::ModelNotConfigured { head: Head::Sheep })
        ));
    }

    #[test]
    fn test_model_path_missing_file() {
        let mut config = Config::default();
        config.models.bovine = Some("/nonexistent/bovine.onnx".into());
        let result = model_path(&config, Head::Bovine, false);
        assert!(matches!(
            result,
            Err(Error::ModelFileNotFound {
                head: Head::Bovine,
                ..
            })
        ));
    }

    #[test]
    fn test_offline_only_needs_lite_model() {
        let dir = TempDir::new().unwrap();
        let lite = dir.path().join("lite.onnx");
        File::create(&lite).unwrap();

        let mut config = Config::default();
        config.models.lite = Some(lite);

        assert!(validate_model_paths(&config, true).is_ok());
        assert!(validate_model_paths(&config, false).is_err());
    }
}
