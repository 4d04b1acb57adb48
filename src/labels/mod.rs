//! Class-name resolution for the classification heads.

mod registry;
mod sources;

pub use registry::{ResolvedLabels, resolve_labels, resolve_head};
pub use sources::{InlineLabels, LabelFile, LabelSource, TrainingDirs, read_label_file};

use crate::constants::training_dirs;
use serde::{Deserialize, Serialize};

/// A classification head of the ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Head {
    /// Coarse species classifier.
    Species,
    /// Sheep breed classifier.
    Sheep,
    /// Bovine (cattle and buffalo) breed classifier.
    Bovine,
}

impl Head {
    /// All heads, species first.
    pub const ALL: [Self; 3] = [Self::Species, Self::Sheep, Self::Bovine];

    /// Folder under the data directory whose `train/` split names the classes.
    pub const fn training_dir(self) -> &'static str {
        match self {
            Self::Species => training_dirs::SPECIES,
            Self::Sheep => training_dirs::SHEEP,
            Self::Bovine => training_dirs::BOVINE,
        }
    }
}

impl std::fmt::Display for Head {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Species => write!(f, "species"),
            Self::Sheep => write!(f, "sheep"),
            Self::Bovine => write!(f, "bovine"),
        }
    }
}

/// Ordered class names for one head.
///
/// Index `i` of a model's probability vector corresponds to `names()[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelSet {
    head: Head,
    names: Vec<String>,
}

impl LabelSet {
    /// Create a label set for a head.
    pub fn new(head: Head, names: Vec<String>) -> Self {
        Self { head, names }
    }

    /// Create an empty label set.
    pub fn empty(head: Head) -> Self {
        Self::new(head, Vec::new())
    }

    /// Head these labels belong to.
    pub fn head(&self) -> Head {
        self.head
    }

    /// Ordered class names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the set has no classes.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Class name at `index`, or a synthesized `"{head}_class_{index}"` placeholder
    /// when the model emits more classes than the set names.
    pub fn name_for(&self, index: usize) -> String {
        self.names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("{}_class_{index}", self.head))
    }

    /// Whether `name` is one of this set's classes.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_for_in_range() {
        let labels = LabelSet::new(Head::Bovine, vec!["Gir".into(), "Sahiwal".into()]);
        assert_eq!(labels.name_for(1), "Sahiwal");
    }

    #[test]
    fn test_name_for_out_of_range_is_placeholder() {
        let labels = LabelSet::new(Head::Sheep, vec!["Deccani".into()]);
        assert_eq!(labels.name_for(4), "sheep_class_4");
    }

    #[test]
    fn test_head_display_and_dirs() {
        assert_eq!(Head::Species.to_string(), "species");
        assert_eq!(Head::Sheep.training_dir(), "sheep_breeds");
        assert_eq!(Head::Bovine.training_dir(), "bovine_breeds");
    }
}
