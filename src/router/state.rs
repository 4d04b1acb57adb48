//! Router stages and the per-request state machine.

use crate::error::{Error, Result};
use serde::Serialize;

/// Pipeline stage a model runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Coarse species classification.
    Species,
    /// Routed breed classification.
    Breed,
    /// Both breed heads after an uncertain species result.
    Guardrail,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Species => write!(f, "species"),
            Self::Breed => write!(f, "breed"),
            Self::Guardrail => write!(f, "guardrail"),
        }
    }
}

/// Why a request ended without a committed breed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// Species confidence fell below the species threshold.
    LowSpeciesConfidence,
    /// The lite ensemble has no breed heads.
    OfflineMode,
}

/// Router state for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "reason")]
pub enum RouterState {
    /// Nothing has run yet.
    Idle,
    /// Quality gate finished.
    QualityChecked,
    /// Species model finished.
    SpeciesClassified,
    /// A breed head ran on the routed species.
    BreedRouted,
    /// Both breed heads are being cross-checked.
    GuardrailEngaged,
    /// Request ended without a committed breed.
    Terminated(TerminationReason),
}

impl RouterState {
    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: Self) -> bool {
        use RouterState::{
            BreedRouted, GuardrailEngaged, Idle, QualityChecked, SpeciesClassified, Terminated,
        };
        matches!(
            (self, next),
            (Idle, QualityChecked)
                | (QualityChecked, SpeciesClassified)
                | (SpeciesClassified, BreedRouted | GuardrailEngaged)
                | (SpeciesClassified, Terminated(TerminationReason::OfflineMode))
                | (
                    GuardrailEngaged,
                    Terminated(TerminationReason::LowSpeciesConfidence)
                )
        )
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::BreedRouted | Self::Terminated(_))
    }
}

impl std::fmt::Display for RouterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::QualityChecked => write!(f, "quality_checked"),
            Self::SpeciesClassified => write!(f, "species_classified"),
            Self::BreedRouted => write!(f, "breed_routed"),
            Self::GuardrailEngaged => write!(f, "guardrail_engaged"),
            Self::Terminated(TerminationReason::LowSpeciesConfidence) => {
                write!(f, "terminated (low species confidence)")
            }
            Self::Terminated(TerminationReason::OfflineMode) => {
                write!(f, "terminated (offline mode)")
            }
        }
    }
}

/// Tracks one request's state and rejects illegal transitions.
#[derive(Debug)]
pub(crate) struct StateMachine {
    state: RouterState,
}

impl StateMachine {
    pub(crate) fn new() -> Self {
        Self {
            state: RouterState::Idle,
        }
    }

    pub(crate) fn state(&self) -> RouterState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: RouterState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::Internal {
                message: format!("illegal router transition {} -> {next}", self.state),
            });
        }
        tracing::trace!("Router state {} -> {next}", self.state);
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let mut machine = StateMachine::new();
        assert!(machine.advance(RouterState::QualityChecked).is_ok());
        assert!(machine.advance(RouterState::SpeciesClassified).is_ok());
        assert!(machine.advance(RouterState::BreedRouted).is_ok());
        assert!(machine.state().is_terminal());
    }

    #[test]
    fn test_guardrail_path() {
        let mut machine = StateMachine::new();
        for next in [
            RouterState::QualityChecked,
            RouterState::SpeciesClassified,
            RouterState::GuardrailEngaged,
            RouterState::Terminated(TerminationReason::LowSpeciesConfidence),
        ] {
            assert!(machine.advance(next).is_ok());
        }
    }

    #[test]
    fn test_illegal_transitions_rejected() {
        assert!(!RouterState::Idle.can_transition_to(RouterState::SpeciesClassified));
        assert!(!RouterState::BreedRouted.can_transition_to(RouterState::GuardrailEngaged));
        assert!(!RouterState::SpeciesClassified.can_transition_to(RouterState::Terminated(
            TerminationReason::LowSpeciesConfidence
        )));
        assert!(!RouterState::GuardrailEngaged.can_transition_to(RouterState::Terminated(
            TerminationReason::OfflineMode
        )));

        let mut machine = StateMachine::new();
        assert!(machine.advance(RouterState::BreedRouted).is_err());
        assert_eq!(machine.state(), RouterState::Idle);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Guardrail.to_string(), "guardrail");
    }
}
