//! Label sources tried in order by the registry.

use crate::constants::training_dirs::TRAIN_SPLIT;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One way of producing a head's ordered class names.
///
/// `None` means the source has nothing to offer and the next one should be tried.
pub trait LabelSource {
    /// Short description used in log output.
    fn describe(&self) -> String;

    /// Produce a non-empty label list, or `None`.
    fn resolve(&self) -> Option<Vec<String>>;
}

/// Explicit ordered list from configuration.
#[derive(Debug, Clone)]
pub struct InlineLabels(pub Vec<String>);

impl LabelSource for InlineLabels {
    fn describe(&self) -> String {
        format!("inline list ({} labels)", self.0.len())
    }

    fn resolve(&self) -> Option<Vec<String>> {
        (!self.0.is_empty()).then(|| self.0.clone())
    }
}

/// External list file referenced from configuration.
#[derive(Debug, Clone)]
pub struct LabelFile(pub PathBuf);

impl LabelSource for LabelFile {
    fn describe(&self) -> String {
        format!("labels file {}", self.0.display())
    }

    fn resolve(&self) -> Option<Vec<String>> {
        if !self.0.exists() {
            debug!("Labels file does not exist: {}", self.0.display());
            return None;
        }
        match read_label_file(&self.0) {
            Ok(labels) if !labels.is_empty() => Some(labels),
            Ok(_) => {
                warn!("Labels file is empty: {}", self.0.display());
                None
            }
            Err(e) => {
                warn!("Ignoring unreadable labels file: {e}");
                None
            }
        }
    }
}

/// Class folders under `<data_dir>/<head_dir>/train`, sorted alphabetically.
#[derive(Debug, Clone)]
pub struct TrainingDirs(pub PathBuf);

impl TrainingDirs {
    /// Build the source for a head's training folder under `data_dir`.
    pub fn for_head(data_dir: &Path, head_dir: &str) -> Self {
        Self(data_dir.join(head_dir).join(TRAIN_SPLIT))
    }
}

impl LabelSource for TrainingDirs {
    fn describe(&self) -> String {
        format!("training folders in {}", self.0.display())
    }

    fn resolve(&self) -> Option<Vec<String>> {
        let entries = std::fs::read_dir(&self.0).ok()?;
        let mut names: Vec<String> = entries
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        (!names.is_empty()).then_some(names)
    }
}

/// Read labels from a file.
///
/// # File Format
/// - A JSON array of strings (`["Gir", "Sahiwal"]`), or
/// - One label per line; blank lines are ignored
///
/// # Errors
/// - Returns error if file cannot be read
/// - Returns error if file contains invalid UTF-8
pub fn read_label_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path).map_err(|e| Error::ConfigValidation {
        message: format!("failed to read labels file '{}': {e}", path.display()),
    })?;

    if contents.trim_start().starts_with('[') {
        return serde_json::from_str::<Vec<String>>(&contents).map_err(|e| {
            Error::ConfigValidation {
                message: format!("labels file '{}' is not a JSON string array: {e}", path.display()),
            }
        });
    }

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test setup code - panics are acceptable
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_read_label_file_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"["Gir", "Sahiwal", "Murrah"]"#).unwrap();

        let labels = read_label_file(file.path()).unwrap();
        assert_eq!(labels, vec!["Gir", "Sahiwal", "Murrah"]);
    }

    #[test]
    fn test_read_label_file_lines() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Deccani").unwrap();
        writeln!(file).unwrap(); // blank line should be ignored
        writeln!(file, "  Nellore ").unwrap();

        let labels = read_label_file(file.path()).unwrap();
        assert_eq!(labels, vec!["Deccani", "Nellore"]);
    }

    #[test]
    fn test_read_label_file_bad_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[1, 2, 3]").unwrap();
        assert!(read_label_file(file.path()).is_err());
    }

    #[test]
    fn test_read_label_file_not_found() {
        let result = read_label_file(Path::new("nonexistent.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_inline_empty_is_none() {
        assert!(InlineLabels(Vec::new()).resolve().is_none());
    }

    #[test]
    fn test_label_file_unparseable_is_none() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[\"unterminated").unwrap();
        assert!(LabelFile(file.path().to_path_buf()).resolve().is_none());
    }

    #[test]
    fn test_training_dirs_sorted_and_dirs_only() {
        let dir = TempDir::new().unwrap();
        let train = dir.path().join("bovine_breeds").join("train");
        for name in ["Sahiwal", "Gir", "Murrah"] {
            std::fs::create_dir_all(train.join(name)).unwrap();
        }
        File::create(train.join("notes.txt")).unwrap();

        let source = TrainingDirs::for_head(dir.path(), "bovine_breeds");
        assert_eq!(source.resolve().unwrap(), vec!["Gir", "Murrah", "Sahiwal"]);
    }

    #[test]
    fn test_training_dirs_missing_is_none() {
        let dir = TempDir::new().unwrap();
        assert!(TrainingDirs::for_head(dir.path(), "sheep_breeds")
            .resolve()
            .is_none());
    }
}
