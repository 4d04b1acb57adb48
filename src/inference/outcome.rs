//! Classification outcomes built from model probability vectors.

use crate::constants::confidence;
use crate::error::{Error, Result};
use crate::labels::LabelSet;
use serde::Serialize;

/// A single ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    /// Class name.
    pub label: String,
    /// Probability of this class.
    pub confidence: f32,
}

/// Result of one model invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationOutcome {
    /// Arg-max class name (or a placeholder past the end of the label set).
    pub label: String,
    /// Arg-max index into the distribution.
    pub index: usize,
    /// Probability at the arg-max index.
    pub confidence: f32,
    /// Full probability vector aligned to the label set.
    pub distribution: Vec<f32>,
}

impl ClassificationOutcome {
    /// Build an outcome from a probability vector.
    ///
    /// Ties resolve to the lowest index. The vector must be non-empty, at least
    /// as long as `labels`, and every entry must be a probability in `[0, 1]`.
    pub fn from_distribution(labels: &LabelSet, distribution: Vec<f32>) -> Result<Self> {
        if distribution.is_empty() {
            return Err(Error::Inference {
                reason: "model returned an empty probability vector".to_string(),
            });
        }
        if distribution.len() < labels.len() {
            return Err(Error::Inference {
                reason: format!(
                    "model returned {} probabilities for {} {} labels",
                    distribution.len(),
                    labels.len(),
                    labels.head()
                ),
            });
        }
        if let Some(i) = distribution.iter().position(|p| !p.is_finite()) {
            return Err(Error::Inference {
                reason: format!("non-finite probability at index {i}"),
            });
        }
        if let Some(i) = distribution
            .iter()
            .position(|p| !(confidence::MIN..=confidence::MAX).contains(p))
        {
            return Err(Error::Inference {
                reason: format!(
                    "probability {} at index {i} is outside [0, 1]",
                    distribution[i]
                ),
            });
        }

        let index = argmax(&distribution);
        let confidence = distribution[index];
        Ok(Self {
            label: labels.name_for(index),
            index,
            confidence,
            distribution,
        })
    }

    /// The `k` most probable classes, highest first. Equal scores keep index order.
    pub fn top_k(&self, labels: &LabelSet, k: usize) -> Vec<Candidate> {
        let mut ranked: Vec<(usize, f32)> = self.distribution.iter().copied().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked
            .into_iter()
            .take(k)
            .map(|(i, p)| Candidate {
                label: labels.name_for(i),
                confidence: p,
            })
            .collect()
    }
}

/// Index of the largest value; the first occurrence wins on ties.
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}
