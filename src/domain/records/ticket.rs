//! Maintenance ticket analysis record

use serde::{Deserialize, Serialize};

/// Result of triaging one maintenance ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketAnalysis {
    /// Extracted key/value facts, in key order
    pub core_info: Vec<(String, String)>,
    /// Whether the report is plausible and complete
    pub validity_check: String,
    /// How well the stated cause matches the symptoms
    pub cause_match: String,
    /// Ranked solutions, best first
    pub solutions: Vec<String>,
}
