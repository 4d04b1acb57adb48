//! Router output types.

use super::policy::{ConfidenceBand, LatencyClass, RoutedHead, Verdict};
use super::state::RouterState;
use crate::imaging::QualityReport;
use crate::inference::{Candidate, ClassificationOutcome};
use crate::labels::Head;
use serde::Serialize;

/// Breed result on the routed head.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreedOutcome {
    /// Head that produced the result.
    pub head: Head,
    /// Top-1 outcome.
    #[serde(flatten)]
    pub outcome: ClassificationOutcome,
    /// Accepted or needs verification.
    pub verdict: Verdict,
    /// Display band of the top-1 confidence.
    pub band: ConfidenceBand,
    /// Highest-ranked candidates.
    pub top_k: Vec<Candidate>,
}

/// One side of the guardrail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HeadOutcome {
    /// The head produced an outcome.
    Available(ClassificationOutcome),
    /// The head failed; the other side is still reported.
    Unavailable {
        /// Why the head failed.
        reason: String,
    },
}

impl HeadOutcome {
    /// Outcome, if the head succeeded.
    pub fn outcome(&self) -> Option<&ClassificationOutcome> {
        match self {
            Self::Available(outcome) => Some(outcome),
            Self::Unavailable { .. } => None,
        }
    }
}

/// Top-1 of both breed heads after an uncertain species result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GuardrailOutcomes {
    /// Sheep head.
    pub sheep: HeadOutcome,
    /// Bovine head.
    pub bovine: HeadOutcome,
}

/// Final output of one routed request.
///
/// Never mutated after the router returns it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceResult {
    /// Species stage outcome.
    pub species: ClassificationOutcome,
    /// Display band of the species confidence.
    pub species_band: ConfidenceBand,
    /// Breed outcome, present iff the species was confident and the session is online.
    pub breed: Option<BreedOutcome>,
    /// Advisory quality report for the original image.
    pub quality: QualityReport,
    /// Breed head chosen by the dispatch.
    pub routed_head: RoutedHead,
    /// Both heads' top-1 when the guardrail engaged.
    pub guardrail: Option<GuardrailOutcomes>,
    /// State the request ended in.
    pub final_state: RouterState,
    /// Time spent in model inference.
    pub elapsed_ms: f64,
    /// Latency indicator for `elapsed_ms`.
    pub latency: LatencyClass,
    #[serde(rename = "requires_manual_check")]
    pub(crate) manual_check: bool,
}

impl InferenceResult {
    /// Whether a human should review this result before it is used.
    ///
    /// True when the species is below threshold, the breed needs verification,
    /// or any reported confidence is below the absolute floor.
    pub fn requires_manual_check(&self) -> bool {
        self.manual_check
    }

    /// Label a correction would be recorded against: the breed when one was
    /// committed, otherwise the species.
    pub fn predicted_label(&self) -> &str {
        self.breed
            .as_ref()
            .map_or(self.species.label.as_str(), |b| b.outcome.label.as_str())
    }

    /// Confidence matching [`Self::predicted_label`].
    pub fn predicted_confidence(&self) -> f32 {
        self.breed
            .as_ref()
            .map_or(self.species.confidence, |b| b.outcome.confidence)
    }
}
