//! Full or lite model ensemble, chosen once per session.

use super::model::{ImageClassifier, OnnxClassifier};
use crate::config::{Config, model_path};
use crate::error::Result;
use crate::labels::Head;
use std::sync::Arc;
use tracing::info;

/// Models available to the router.
#[derive(Clone)]
pub enum ModelEnsemble {
    /// Species model plus both breed heads.
    Full {
        /// Species classifier.
        species: Arc<dyn ImageClassifier>,
        /// Sheep breed classifier.
        sheep: Arc<dyn ImageClassifier>,
        /// Bovine breed classifier.
        bovine: Arc<dyn ImageClassifier>,
    },
    /// Lightweight species-only model for offline use.
    Lite {
        /// Species classifier.
        species: Arc<dyn ImageClassifier>,
    },
}

impl std::fmt::Debug for ModelEnsemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Full { .. } => write!(f, "ModelEnsemble::Full"),
            Self::Lite { .. } => write!(f, "ModelEnsemble::Lite"),
        }
    }
}

impl ModelEnsemble {
    /// Load the ONNX models the session needs.
    ///
    /// Offline sessions load only the lite species model.
    pub fn load(config: &Config, offline: bool) -> Result<Self> {
        if offline {
            let path = model_path(config, Head::Species, true)?;
            info!("Offline mode: loading lite species model only");
            return Ok(Self::Lite {
                species: Arc::new(OnnxClassifier::load(Head::Species, path)?),
            });
        }

        let load = |head: Head| -> Result<Arc<dyn ImageClassifier>> {
            let path = model_path(config, head, false)?;
            Ok(Arc::new(OnnxClassifier::load(head, path)?))
        };
        Ok(Self::Full {
            species: load(Head::Species)?,
            sheep: load(Head::Sheep)?,
            bovine: load(Head::Bovine)?,
        })
    }

    /// Whether this is the species-only ensemble.
    pub fn is_lite(&self) -> bool {
        matches!(self, Self::Lite { .. })
    }

    /// Species classifier, present in both variants.
    pub fn species(&self) -> &dyn ImageClassifier {
        match self {
            Self::Full { species, .. } | Self::Lite { species } => species.as_ref(),
        }
    }

    /// Breed classifier for a head, absent in the lite variant.
    pub fn breed(&self, head: Head) -> Option<&dyn ImageClassifier> {
        match (self, head) {
            (Self::Full { sheep, .. }, Head::Sheep) => Some(sheep.as_ref()),
            (Self::Full { bovine, .. }, Head::Bovine) => Some(bovine.as_ref()),
            _ => None,
        }
    }
}
