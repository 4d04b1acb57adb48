//! Platform-specific configuration paths.

use crate::config::{Config, LabelSpec};
use crate::constants::APP_NAME;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Get the configuration directory for the current platform.
///
/// - Linux: `~/.config/breedid/`
/// - macOS: `~/Library/Application Support/breedid/`
/// - Windows: `%APPDATA%\breedid\`
pub fn config_dir() -> Result<PathBuf> {
    ProjectDirs::from("", "", APP_NAME)
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the config file.
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Make relative model, label and ledger paths relative to `base`.
///
/// `base` is the directory of the config file the paths were read from.
pub(crate) fn resolve_relative_paths(config: &mut Config, base: &Path) {
    let models = &mut config.models;
    for path in [
        &mut models.species,
        &mut models.sheep,
        &mut models.bovine,
        &mut models.lite,
    ]
    .into_iter()
    .flatten()
    {
        rebase(path, base);
    }

    let labels = &mut config.labels;
    rebase(&mut labels.data_dir, base);
    for spec in [&mut labels.species, &mut labels.sheep, &mut labels.bovine]
        .into_iter()
        .flatten()
    {
        if let LabelSpec::File(path) = spec {
            rebase(path, base);
        }
    }

    rebase(&mut config.ledger.path, base);
}

fn rebase(path: &mut PathBuf, base: &Path) {
    if path.is_relative() {
        *path = base.join(&*path);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_returns_path() {
        let result = config_dir();
        assert!(result.is_ok());
        let path = result.ok().unwrap();
        assert!(path.to_string_lossy().contains("breedid"));
    }

    #[test]
    fn test_config_file_path_ends_with_toml() {
        let path = config_file_path().unwrap();
        assert!(path.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn test_relative_paths_follow_config_dir() {
        let mut config = Config::default();
        config.models.species = Some(PathBuf::from("models/species.onnx"));
        config.models.bovine = Some(PathBuf::from("/opt/models/bovine.onnx"));
        config.labels.sheep = Some(LabelSpec::File(PathBuf::from("sheep.txt")));

        resolve_relative_paths(&mut config, Path::new("/etc/breedid"));

        assert_eq!(
            config.models.species,
            Some(PathBuf::from("/etc/breedid/models/species.onnx"))
        );
        assert_eq!(
            config.models.bovine,
            Some(PathBuf::from("/opt/models/bovine.onnx"))
        );
        assert_eq!(
            config.labels.sheep,
            Some(LabelSpec::File(PathBuf::from("/etc/breedid/sheep.txt")))
        );
        assert!(config.ledger.path.starts_with("/etc/breedid"));
        assert!(config.labels.data_dir.starts_with("/etc/breedid"));
        // Inline lists are untouched.
        assert!(matches!(config.labels.species, Some(LabelSpec::List(_))));
    }
}
