//! Deposition process recommendation record

use serde::{Deserialize, Serialize};

/// One recommended precursor/reactant pairing with its process window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub reactant_a: String,
    pub reactant_b: String,
    pub reaction_temp: String,
    pub dose_a: String,
    pub heat_a: String,
    pub dose_b: String,
    pub heat_b: String,
    /// Literature citation the recommendation is drawn from
    pub source: String,
    /// Weighted score, always within 0..=100
    pub score: u8,
    pub details: String,
    /// Precursor A is available in the local library
    pub is_local: bool,
}

impl RecommendationRecord {
    /// `A + B` label used in listings
    pub fn scheme(&self) -> String {
        format!("{} + {}", self.reactant_a, self.reactant_b)
    }
}

/// Highest score first; local precursors win ties.
pub fn rank(records: &mut [RecommendationRecord]) {
    records.sort_by(|a, b| b.score.cmp(&a.score).then(b.is_local.cmp(&a.is_local)));
}
