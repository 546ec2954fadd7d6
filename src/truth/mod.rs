//! Truth values
//!
//! Truth values carry the uncertainty attached to judgments:
//! - Frequency (f): the estimated probability of the statement being true
//! - Confidence (c): the weight of evidence supporting the estimation
//!
//! The full truth algebra lives in the rule tables, outside this crate; the
//! control layer only needs construction, expectation (which drives premise
//! budgets) and comparison.

use std::fmt;
use ordered_float::OrderedFloat;

/// Truth value representation
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Truth {
    /// Frequency: probability estimate [0.0, 1.0]
    frequency: OrderedFloat<f32>,

    /// Confidence: evidence weight [0.0, 1.0]
    confidence: OrderedFloat<f32>,
}

impl Truth {
    /// Create a new truth value; components are clamped to [0, 1]
    pub fn new(frequency: f32, confidence: f32) -> Self {
        Truth {
            frequency: OrderedFloat(frequency.clamp(0.0, 1.0)),
            confidence: OrderedFloat(confidence.clamp(0.0, 1.0)),
        }
    }

    /// Get the frequency component
    pub fn frequency(&self) -> f32 {
        self.frequency.0
    }

    /// Get the confidence component
    pub fn confidence(&self) -> f32 {
        self.confidence.0
    }

    /// The expected outcome: `c * (f - 1/2) + 1/2`. At zero confidence this
    /// is exactly 1/2, the same weight a premise with no belief receives.
    pub fn expectation(&self) -> f32 {
        self.confidence.0 * (self.frequency.0 - 0.5) + 0.5
    }

    /// Negate this truth value (1 - frequency, same confidence)
    pub fn neg(&self) -> Self {
        Truth::new(1.0 - self.frequency.0, self.confidence.0)
    }

    /// Default truth value for input judgments
    pub fn default_judgment() -> Self {
        Truth::new(1.0, 0.9)
    }
}

impl fmt::Display for Truth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "%{:.2};{:.2}%",
            self.frequency.0, self.confidence.0
        )
    }
}
