//! Label registry: resolves every head's label set through the fallback chain.

use super::sources::{InlineLabels, LabelFile, LabelSource, TrainingDirs};
use super::{Head, LabelSet};
use crate::config::{LabelSpec, LabelsConfig};
use crate::error::{Error, Result};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Label sets for all three heads.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLabels {
    /// Species head labels.
    pub species: LabelSet,
    /// Sheep head labels.
    pub sheep: LabelSet,
    /// Bovine head labels.
    pub bovine: LabelSet,
}

impl ResolvedLabels {
    /// Build from explicit lists, mainly for callers that manage labels themselves.
    pub fn from_lists(species: Vec<String>, sheep: Vec<String>, bovine: Vec<String>) -> Self {
        Self {
            species: LabelSet::new(Head::Species, species),
            sheep: LabelSet::new(Head::Sheep, sheep),
            bovine: LabelSet::new(Head::Bovine, bovine),
        }
    }

    /// Label set for a head, which may be empty.
    pub fn for_head(&self, head: Head) -> &LabelSet {
        match head {
            Head::Species => &self.species,
            Head::Sheep => &self.sheep,
            Head::Bovine => &self.bovine,
        }
    }

    /// Label set for a head that inference is about to use.
    ///
    /// An empty set is a configuration error for that head.
    pub fn require(&self, head: Head) -> Result<&LabelSet> {
        let labels = self.for_head(head);
        if labels.is_empty() {
            return Err(Error::EmptyLabelSet { head });
        }
        Ok(labels)
    }

    /// Heads whose label set includes `name`.
    pub fn heads_with(&self, name: &str) -> Vec<Head> {
        Head::ALL
            .into_iter()
            .filter(|&head| self.for_head(head).contains(name))
            .collect()
    }
}

/// Resolve the species, sheep and bovine label sets from configuration.
pub fn resolve_labels(config: &LabelsConfig) -> ResolvedLabels {
    ResolvedLabels {
        species: resolve_head(Head::Species, config.species.as_ref(), &config.data_dir),
        sheep: resolve_head(Head::Sheep, config.sheep.as_ref(), &config.data_dir),
        bovine: resolve_head(Head::Bovine, config.bovine.as_ref(), &config.data_dir),
    }
}

/// Resolve one head: inline list, then labels file, then training folders, then empty.
pub fn resolve_head(head: Head, spec: Option<&LabelSpec>, data_dir: &Path) -> LabelSet {
    let mut sources: Vec<Box<dyn LabelSource>> = Vec::with_capacity(3);
    match spec {
        Some(LabelSpec::List(names)) => sources.push(Box::new(InlineLabels(names.clone()))),
        Some(LabelSpec::File(path)) => sources.push(Box::new(LabelFile(path.clone()))),
        None => {}
    }
    sources.push(Box::new(TrainingDirs::for_head(data_dir, head.training_dir())));

    for source in &sources {
        if let Some(names) = source.resolve() {
            info!(
                "Resolved {} {head} labels from {}",
                names.len(),
                source.describe()
            );
            return LabelSet::new(head, names);
        }
        debug!("No {head} labels from {}", source.describe());
    }

    debug!("No {head} labels resolved; leaving set empty");
    LabelSet::empty(head)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn make_train_dirs(root: &Path, head_dir: &str, classes: &[&str]) {
        for class in classes {
            std::fs::create_dir_all(root.join(head_dir).join("train").join(class)).unwrap();
        }
    }

    #[test]
    fn test_inline_list_wins_over_training_dirs() {
        let dir = TempDir::new().unwrap();
        make_train_dirs(dir.path(), "sheep_breeds", &["Garole"]);

        let spec = LabelSpec::List(vec!["Deccani".into(), "Nellore".into()]);
        let labels = resolve_head(Head::Sheep, Some(&spec), dir.path());
        assert_eq!(labels.names(), ["Deccani", "Nellore"]);
    }

    #[test]
    fn test_label_file_used_when_parseable() {
        let dir = TempDir::new().unwrap();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"["Gir", "Sahiwal"]"#).unwrap();

        let spec = LabelSpec::File(file.path().to_path_buf());
        let labels = resolve_head(Head::Bovine, Some(&spec), dir.path());
        assert_eq!(labels.names(), ["Gir", "Sahiwal"]);
    }

    #[test]
    fn test_empty_list_falls_through_to_training_dirs() {
        let dir = TempDir::new().unwrap();
        make_train_dirs(dir.path(), "bovine_breeds", &["Sahiwal", "Gir"]);

        let spec = LabelSpec::List(Vec::new());
        let labels = resolve_head(Head::Bovine, Some(&spec), dir.path());
        assert_eq!(labels.names(), ["Gir", "Sahiwal"]);
    }

    #[test]
    fn test_missing_file_falls_through_to_training_dirs() {
        let dir = TempDir::new().unwrap();
        make_train_dirs(dir.path(), "sheep_breeds", &["Marwari"]);

        let spec = LabelSpec::File(dir.path().join("missing.json"));
        let labels = resolve_head(Head::Sheep, Some(&spec), dir.path());
        assert_eq!(labels.names(), ["Marwari"]);
    }

    #[test]
    fn test_nothing_resolves_to_empty() {
        let dir = TempDir::new().unwrap();
        let labels = resolve_head(Head::Sheep, None, dir.path());
        assert!(labels.is_empty());
        assert_eq!(labels.head(), Head::Sheep);
    }

    #[test]
    fn test_require_empty_is_configuration_error() {
        let species = vec!["bovine".into(), "sheep".into()];
        let labels = ResolvedLabels::from_lists(species, vec![], vec![]);
        assert!(labels.require(Head::Species).is_ok());
        assert!(matches!(
            labels.require(Head::Sheep),
            Err(Error::EmptyLabelSet { head: Head::Sheep })
        ));
    }

    #[test]
    fn test_heads_with_finds_matching_sets() {
        let labels = ResolvedLabels::from_lists(
            vec!["bovine".into(), "sheep".into()],
            vec!["Deccani".into(), "Nellore".into()],
            vec!["Gir".into(), "Nellore".into()],
        );
        assert_eq!(labels.heads_with("Gir"), [Head::Bovine]);
        assert_eq!(labels.heads_with("sheep"), [Head::Species]);
        assert_eq!(labels.heads_with("Nellore"), [Head::Sheep, Head::Bovine]);
        assert!(labels.heads_with("gir").is_empty());
        assert!(labels.heads_with("Ongole").is_empty());
    }

    #[test]
    fn test_resolve_labels_uses_default_species() {
        let dir = TempDir::new().unwrap();
        let config = LabelsConfig {
            data_dir: dir.path().to_path_buf(),
            ..LabelsConfig::default()
        };
        let labels = resolve_labels(&config);
        assert_eq!(labels.species.names(), ["bovine", "sheep"]);
        assert!(labels.sheep.is_empty());
        assert!(labels.bovine.is_empty());
    }
}
