//! Types for assessment history storage.

use crate::core::risk::RiskTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed assessment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: String,
    pub assessed_at: DateTime<Utc>,
    /// Query image path as given
    pub query: String,
    /// Corpus directory as given
    pub corpus: String,
    pub image_match: bool,
    /// First corpus file that met the threshold
    pub matched_candidate: Option<String>,
    /// Labels of the affirmed symptoms
    pub symptoms: Vec<String>,
    pub symptom_count: u32,
    pub tier: RiskTier,
}

/// Result of listing assessment history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentHistoryPage {
    pub entries: Vec<AssessmentRecord>,
    pub total_count: usize,
}
