//! Explicit per-session state passed to the router's callers and the ledger.

use crate::Result;
use crate::config::{Config, SessionConfig, validate_model_paths};
use crate::inference::ModelEnsemble;
use crate::ledger::ActiveLearningQueue;
use crate::router::InferenceResult;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One processed image in the session history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// When the image was processed.
    pub timestamp: DateTime<Utc>,
    /// Content hash of the image.
    pub image_hash: String,
    /// File name of the image.
    pub file_name: String,
    /// Species label.
    pub species: String,
    /// Species confidence.
    pub species_confidence: f32,
    /// Breed label, when one was committed.
    pub breed: Option<String>,
    /// Breed confidence, when one was committed.
    pub breed_confidence: Option<f32>,
    /// Time spent in inference.
    pub inference_ms: f64,
}

impl HistoryEntry {
    /// Build an entry from a routed result.
    pub fn from_result(image_hash: &str, file_name: &str, result: &InferenceResult) -> Self {
        Self {
            timestamp: Utc::now(),
            image_hash: image_hash.to_string(),
            file_name: file_name.to_string(),
            species: result.species.label.clone(),
            species_confidence: result.species.confidence,
            breed: result.breed.as_ref().map(|b| b.outcome.label.clone()),
            breed_confidence: result.breed.as_ref().map(|b| b.outcome.confidence),
            inference_ms: result.elapsed_ms,
        }
    }
}

/// Mutable session flags and accumulators.
#[derive(Debug, Default)]
pub struct SessionContext {
    /// Use the lite species-only ensemble.
    pub offline: bool,
    /// Keep no history of processed images.
    pub privacy: bool,
    history: Vec<HistoryEntry>,
    /// Corrections recorded this session.
    pub queue: ActiveLearningQueue,
}

impl SessionContext {
    /// Start a session from configured defaults.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            offline: config.offline,
            privacy: config.privacy,
            ..Self::default()
        }
    }

    /// Load the ensemble this session runs with.
    ///
    /// Offline sessions get the lite species-only model; otherwise all
    /// three heads must be configured and present.
    pub fn load_ensemble(&self, config: &Config) -> Result<ModelEnsemble> {
        validate_model_paths(config, self.offline)?;
        ModelEnsemble::load(config, self.offline)
    }

    /// Record a processed image unless privacy mode is on.
    ///
    /// Returns whether the entry was kept.
    pub fn record_history(&mut self, entry: HistoryEntry) -> bool {
        if self.privacy {
            return false;
        }
        self.history.push(entry);
        true
    }

    /// History entries in processing order.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    /// Forget the history.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}
