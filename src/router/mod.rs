//! Hierarchical inference router.
//!
//! Quality gate, species stage, then either the routed breed head or the
//! guardrail over both breed heads.

mod engine;
mod policy;
mod result;
mod state;

pub use engine::{HierarchicalRouter, RouterSettings};
pub use policy::{ConfidenceBand, ConfidencePolicy, LatencyClass, RoutedHead, Verdict};
pub use result::{BreedOutcome, GuardrailOutcomes, HeadOutcome, InferenceResult};
pub use state::{RouterState, Stage, TerminationReason};
