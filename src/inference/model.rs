//! Classifier boundary and the ONNX Runtime implementation.

use crate::error::{Error, Result};
use crate::imaging::ModelInput;
use crate::labels::Head;
use ort::session::Session;
use ort::session::builder::GraphOptimizationLevel;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info};

/// Tolerance used to decide whether an output already sums to one.
const PROBABILITY_SUM_TOLERANCE: f32 = 0.01;

/// A model that maps a prepared image to one probability vector.
///
/// Implementations are shared across threads when the guardrail runs both
/// breed heads concurrently.
pub trait ImageClassifier: Send + Sync {
    /// Run the model on one input.
    fn predict(&self, input: &ModelInput) -> Result<Vec<f32>>;
}

/// ONNX model loaded through ONNX Runtime.
pub struct OnnxClassifier {
    head: Head,
    path: PathBuf,
    session: Mutex<Session>,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("head", &self.head)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Load a model file for a head.
    pub fn load(head: Head, path: &Path) -> Result<Self> {
        let load_error = |reason: String| Error::ModelLoad {
            head,
            path: path.to_path_buf(),
            reason,
        };

        let model_bytes = std::fs::read(path).map_err(|e| load_error(e.to_string()))?;
        let builder = Session::builder().map_err(|e| load_error(e.to_string()))?;
        let mut builder = builder
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| load_error(e.to_string()))?;
        let session = builder
            .commit_from_memory(&model_bytes)
            .map_err(|e| load_error(e.to_string()))?;

        info!("Loaded {head} model from {}", path.display());
        Ok(Self {
            head,
            path: path.to_path_buf(),
            session: Mutex::new(session),
        })
    }

    /// Head this model serves.
    pub fn head(&self) -> Head {
        self.head
    }
}

impl ImageClassifier for OnnxClassifier {
    fn predict(&self, input: &ModelInput) -> Result<Vec<f32>> {
        let inference_error = |reason: String| Error::Inference { reason };

        let tensor = ort::value::Tensor::from_array((input.shape(), input.data().to_vec()))
            .map_err(|e| inference_error(e.to_string()))?;

        let mut session = self.session.lock().map_err(|_| Error::Internal {
            message: format!("{} model session lock poisoned", self.head),
        })?;
        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| inference_error(e.to_string()))?;

        let output = outputs
            .values()
            .next()
            .ok_or_else(|| inference_error("model produced no output tensor".to_string()))?;
        let (shape, scores) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| inference_error(e.to_string()))?;
        debug!("{} model output shape: {shape:?}", self.head);

        Ok(to_probabilities(scores.to_vec()))
    }
}

/// Pass probabilities through; convert logits with softmax.
///
/// Scores count as probabilities only when none is negative and they sum to one.
pub fn to_probabilities(scores: Vec<f32>) -> Vec<f32> {
    let sum: f32 = scores.iter().sum();
    let is_distribution = scores.iter().all(|&x| x >= 0.0);
    if is_distribution && (sum - 1.0).abs() < PROBABILITY_SUM_TOLERANCE {
        scores
    } else {
        softmax(&scores)
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = logits.iter().map(|x| (x - max).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.iter().map(|x| x / sum).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probabilities_pass_through() {
        let probs = to_probabilities(vec![0.7, 0.2, 0.1]);
        assert_eq!(probs, vec![0.7, 0.2, 0.1]);
    }

    #[test]
    fn test_logits_get_softmax() {
        let probs = to_probabilities(vec![2.0, 1.0, 0.0]);
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs[0] > probs[1] && probs[1] > probs[2]);
    }

    #[test]
    fn test_logits_summing_to_one_get_softmax() {
        let probs = to_probabilities(vec![1.2, -0.2]);
        assert!(probs.iter().all(|&p| (0.0..=1.0).contains(&p)));
        let sum: f32 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(probs[0] > probs[1]);
    }

    #[test]
    fn test_softmax_large_values_stable() {
        let probs = softmax(&[1000.0, 1000.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!(probs.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_load_missing_model_is_load_error() {
        let result = OnnxClassifier::load(Head::Species, Path::new("/nonexistent/species.onnx"));
        assert!(matches!(
            result,
            Err(Error::ModelLoad {
                head: Head::Species,
                ..
            })
        ));
    }
}
