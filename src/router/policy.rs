//! Confidence policy, banding and head dispatch.

use crate::config::InferenceConfig;
use crate::constants::{confidence, latency};
use crate::labels::Head;
use serde::Serialize;

/// Caller-supplied thresholds for trusting a result automatically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidencePolicy {
    /// Species confidence needed to commit to a breed head.
    pub species_threshold: f32,
    /// Breed confidence needed to accept a breed without review.
    pub breed_threshold: f32,
    /// Any confidence below this always needs a manual check.
    pub manual_check_floor: f32,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            species_threshold: confidence::DEFAULT_SPECIES_THRESHOLD,
            breed_threshold: confidence::DEFAULT_BREED_THRESHOLD,
            manual_check_floor: confidence::MANUAL_CHECK_FLOOR,
        }
    }
}

impl ConfidencePolicy {
    /// Thresholds from inference configuration.
    pub fn from_config(config: &InferenceConfig) -> Self {
        Self {
            species_threshold: config.species_threshold,
            breed_threshold: config.breed_threshold,
            ..Self::default()
        }
    }

    /// Whether species confidence is high enough to route to a breed head.
    pub fn species_confident(&self, confidence: f32) -> bool {
        confidence >= self.species_threshold
    }

    /// Verdict for a breed confidence.
    pub fn breed_verdict(&self, confidence: f32) -> Verdict {
        if confidence >= self.breed_threshold {
            Verdict::Accepted
        } else {
            Verdict::NeedsVerification
        }
    }

    /// Whether a confidence is below the absolute floor.
    pub fn below_floor(&self, confidence: f32) -> bool {
        confidence < self.manual_check_floor
    }
}

/// Whether a breed result can be trusted without review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// At or above the breed threshold.
    Accepted,
    /// Below the breed threshold.
    NeedsVerification,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::NeedsVerification => write!(f, "needs verification"),
        }
    }
}

/// Coarse confidence band for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    /// At or above 0.80.
    High,
    /// At or above 0.50.
    Medium,
    /// Below 0.50.
    Low,
}

impl ConfidenceBand {
    /// Band for a confidence value.
    pub fn from_confidence(confidence: f32) -> Self {
        if confidence >= confidence::HIGH_BAND {
            Self::High
        } else if confidence >= confidence::MANUAL_CHECK_FLOOR {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Breed head chosen from the species result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutedHead {
    /// Sheep breed head.
    Sheep,
    /// Bovine breed head.
    Bovine,
    /// No breed head ran.
    None,
}

impl RoutedHead {
    /// Binary dispatch: `sheep` (any case) goes to the sheep head, every other
    /// species label goes to the bovine head.
    pub fn for_species(label: &str) -> Self {
        if label.eq_ignore_ascii_case("sheep") {
            Self::Sheep
        } else {
            Self::Bovine
        }
    }

    /// Model head for this route.
    pub fn head(self) -> Option<Head> {
        match self {
            Self::Sheep => Some(Head::Sheep),
            Self::Bovine => Some(Head::Bovine),
            Self::None => None,
        }
    }
}

impl std::fmt::Display for RoutedHead {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sheep => write!(f, "sheep"),
            Self::Bovine => write!(f, "bovine"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Inference latency indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LatencyClass {
    /// Under 300 ms.
    Good,
    /// Under 600 ms.
    Medium,
    /// 600 ms or more.
    Poor,
}

impl LatencyClass {
    /// Classify an elapsed time in milliseconds.
    pub fn from_millis(ms: f64) -> Self {
        if ms < latency::GOOD_MS {
            Self::Good
        } else if ms < latency::MEDIUM_MS {
            Self::Medium
        } else {
            Self::Poor
        }
    }
}

impl std::fmt::Display for LatencyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Good => write!(f, "good"),
            Self::Medium => write!(f, "medium"),
            Self::Poor => write!(f, "poor"),
        }
    }
}
