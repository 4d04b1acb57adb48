//! The hierarchical router.

use super::policy::{ConfidenceBand, ConfidencePolicy, LatencyClass, RoutedHead, Verdict};
use super::result::{BreedOutcome, GuardrailOutcomes, HeadOutcome, InferenceResult};
use super::state::{RouterState, Stage, StateMachine, TerminationReason};
use crate::config::{Config, CropMode};
use crate::error::{Error, Result};
use crate::imaging::{ModelInput, apply_crop, assess};
use crate::inference::{ClassificationOutcome, ImageClassifier, ModelEnsemble};
use crate::labels::{Head, ResolvedLabels};
use image::DynamicImage;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Image preparation and reporting settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterSettings {
    /// Square model input size.
    pub input_size: u32,
    /// Scale pixels to `[0, 1]`.
    pub normalize: bool,
    /// Framing applied before inference.
    pub crop: CropMode,
    /// Breed candidates to report.
    pub top_k: usize,
    /// Run the guardrail heads on scoped threads.
    pub parallel_guardrail: bool,
}

impl RouterSettings {
    /// Settings from configuration.
    pub fn from_config(config: &Config) -> Self {
        let inference = &config.inference;
        Self {
            input_size: inference.input_size,
            normalize: inference.normalize,
            crop: inference.crop,
            top_k: inference.top_k,
            parallel_guardrail: inference.parallel_guardrail,
        }
    }
}

/// Two-stage species then breed router.
///
/// Holds no per-request state; `process` can be called concurrently.
#[derive(Debug)]
pub struct HierarchicalRouter {
    ensemble: ModelEnsemble,
    labels: ResolvedLabels,
    policy: ConfidencePolicy,
    settings: RouterSettings,
}

impl HierarchicalRouter {
    /// Create a router.
    pub fn new(
        ensemble: ModelEnsemble,
        labels: ResolvedLabels,
        policy: ConfidencePolicy,
        settings: RouterSettings,
    ) -> Self {
        Self {
            ensemble,
            labels,
            policy,
            settings,
        }
    }

    /// Create a router with policy and settings taken from configuration.
    pub fn from_config(config: &Config, ensemble: ModelEnsemble, labels: ResolvedLabels) -> Self {
        Self::new(
            ensemble,
            labels,
            ConfidencePolicy::from_config(&config.inference),
            RouterSettings::from_config(config),
        )
    }

    /// Confidence policy in effect.
    pub fn policy(&self) -> &ConfidencePolicy {
        &self.policy
    }

    /// Resolved label sets.
    pub fn labels(&self) -> &ResolvedLabels {
        &self.labels
    }

    /// Route one image through quality gate, species stage and breed or guardrail stage.
    ///
    /// `file_size_bytes` and `max_file_size_bytes` feed the quality gate's file-size rule.
    pub fn process(
        &self,
        image: &DynamicImage,
        file_size_bytes: Option<u64>,
        max_file_size_bytes: Option<u64>,
    ) -> Result<InferenceResult> {
        let mut machine = StateMachine::new();

        let quality = assess(image, file_size_bytes, max_file_size_bytes);
        if !quality.overall_pass {
            debug!("Quality gate flagged: {:?}", quality.failed_rules());
        }
        machine.advance(RouterState::QualityChecked)?;

        let cropped = apply_crop(image, self.settings.crop);
        let input =
            ModelInput::from_image(&cropped, self.settings.input_size, self.settings.normalize);

        let start = Instant::now();
        let species = self.classify(
            Stage::Species,
            Head::Species,
            Some(self.ensemble.species()),
            &input,
        )?;
        machine.advance(RouterState::SpeciesClassified)?;
        let species_confident = self.policy.species_confident(species.confidence);
        debug!(
            "Species: {} ({:.4}), confident: {species_confident}",
            species.label, species.confidence
        );

        let mut breed = None;
        let mut guardrail = None;
        let mut routed_head = RoutedHead::None;

        if self.ensemble.is_lite() {
            info!("Offline mode: skipping breed stage");
            machine.advance(RouterState::Terminated(TerminationReason::OfflineMode))?;
        } else if species_confident {
            routed_head = RoutedHead::for_species(&species.label);
            let head = routed_head.head().ok_or_else(|| Error::Internal {
                message: "confident species routed to no head".to_string(),
            })?;
            let labels = self.labels.require(head)?;
            let outcome = self.classify(Stage::Breed, head, self.ensemble.breed(head), &input)?;
            breed = Some(BreedOutcome {
                head,
                verdict: self.policy.breed_verdict(outcome.confidence),
                band: ConfidenceBand::from_confidence(outcome.confidence),
                top_k: outcome.top_k(labels, self.settings.top_k),
                outcome,
            });
            machine.advance(RouterState::BreedRouted)?;
        } else {
            info!(
                "Species confidence {:.4} below {:.2}; engaging guardrail",
                species.confidence, self.policy.species_threshold
            );
            machine.advance(RouterState::GuardrailEngaged)?;
            guardrail = Some(self.run_guardrail(&input)?);
            machine.advance(RouterState::Terminated(
                TerminationReason::LowSpeciesConfidence,
            ))?;
        }

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        let manual_check = !species_confident
            || self.policy.below_floor(species.confidence)
            || breed.as_ref().is_some_and(|b| {
                b.verdict == Verdict::NeedsVerification
                    || self.policy.below_floor(b.outcome.confidence)
            });

        Ok(InferenceResult {
            species_band: ConfidenceBand::from_confidence(species.confidence),
            species,
            breed,
            quality,
            routed_head,
            guardrail,
            final_state: machine.state(),
            elapsed_ms,
            latency: LatencyClass::from_millis(elapsed_ms),
            manual_check,
        })
    }

    /// Run one head: labels are checked before the model is called.
    fn classify(
        &self,
        stage: Stage,
        head: Head,
        classifier: Option<&dyn ImageClassifier>,
        input: &ModelInput,
    ) -> Result<ClassificationOutcome> {
        let labels = self.labels.require(head)?;
        let classifier = classifier.ok_or(Error::ModelNotConfigured { head })?;
        let distribution = classifier
            .predict(input)
            .map_err(|e| model_failure(stage, head, e))?;
        ClassificationOutcome::from_distribution(labels, distribution)
            .map_err(|e| model_failure(stage, head, e))
    }

    /// Run both breed heads independently; one failing side is reported as unavailable.
    fn run_guardrail(&self, input: &ModelInput) -> Result<GuardrailOutcomes> {
        self.labels.require(Head::Sheep)?;
        self.labels.require(Head::Bovine)?;

        let run_side =
            |head: Head| self.classify(Stage::Guardrail, head, self.ensemble.breed(head), input);

        let (sheep, bovine) = if self.settings.parallel_guardrail {
            std::thread::scope(|scope| {
                let sheep = scope.spawn(|| run_side(Head::Sheep));
                let bovine = run_side(Head::Bovine);
                let sheep = sheep.join().unwrap_or_else(|_| {
                    Err(model_failure(
                        Stage::Guardrail,
                        Head::Sheep,
                        Error::Inference {
                            reason: "sheep head panicked".to_string(),
                        },
                    ))
                });
                (sheep, bovine)
            })
        } else {
            (run_side(Head::Sheep), run_side(Head::Bovine))
        };

        match (sheep, bovine) {
            (Err(sheep_err), Err(bovine_err)) => {
                warn!("Guardrail bovine head failed: {bovine_err}");
                Err(sheep_err)
            }
            (sheep, bovine) => Ok(GuardrailOutcomes {
                sheep: side_outcome(sheep),
                bovine: side_outcome(bovine),
            }),
        }
    }
}

fn side_outcome(result: Result<ClassificationOutcome>) -> HeadOutcome {
    match result {
        Ok(outcome) => HeadOutcome::Available(outcome),
        Err(e) => {
            warn!("Guardrail side unavailable: {e}");
            HeadOutcome::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}

/// Attach stage and head context to an adapter error.
fn model_failure(stage: Stage, head: Head, error: Error) -> Error {
    match error {
        Error::Inference { reason } => Error::ModelFailure {
            stage,
            head,
            reason,
        },
        already @ Error::ModelFailure { .. } => already,
        other => Error::ModelFailure {
            stage,
            head,
            reason: other.to_string(),
        },
    }
}
