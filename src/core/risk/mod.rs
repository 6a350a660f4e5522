//! # Risk Module
//!
//! Combines the image match signal with the symptom count into a tier.
//!
//! | Image match | Symptoms >= 3 | Tier     |
//! |-------------|---------------|----------|
//! | yes         | yes           | High     |
//! | yes         | no            | Moderate |
//! | no          | yes           | Moderate |
//! | no          | no            | Low      |
//!
//! Counts are not weighted: one or two symptoms count the same as none,
//! and anything above three counts the same as three.

use crate::error::EvaluateError;
use serde::{Deserialize, Serialize};

/// Number of affirmed symptoms at which the symptom signal turns positive
pub const SYMPTOM_THRESHOLD: u32 = 3;

/// Ordered risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "moderate" => Some(Self::Moderate),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::Low => write!(f, "Low"),
            RiskTier::Moderate => write!(f, "Moderate"),
            RiskTier::High => write!(f, "High"),
        }
    }
}

/// A validated, non-negative symptom count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SymptomCount(u32);

impl SymptomCount {
    pub fn new(count: u32) -> Self {
        Self(count)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    /// Whether the count reaches the symptom threshold
    pub fn is_significant(&self) -> bool {
        self.0 >= SYMPTOM_THRESHOLD
    }
}

impl From<u32> for SymptomCount {
    fn from(count: u32) -> Self {
        Self(count)
    }
}

impl TryFrom<i64> for SymptomCount {
    type Error = EvaluateError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .map(Self)
            .map_err(|_| EvaluateError::InvalidSymptomCount { value })
    }
}

/// Map the two signals to a risk tier
pub fn evaluate(image_match: bool, symptom_count: u32) -> RiskTier {
    match (image_match, SymptomCount::new(symptom_count).is_significant()) {
        (true, true) => RiskTier::High,
        (true, false) | (false, true) => RiskTier::Moderate,
        (false, false) => RiskTier::Low,
    }
}
