//! Typed record produced by one settled action

use super::inventory::InventoryItem;
use super::narrative::{InspectionReport, NarrativeReport, Transcript};
use super::recommendation::RecommendationRecord;
use super::ticket::TicketAnalysis;

#[derive(Debug, Clone, PartialEq)]
pub enum DomainRecord {
    Recommendations(Vec<RecommendationRecord>),
    Ticket(TicketAnalysis),
    Inventory(InventoryItem),
    Inspection(InspectionReport),
    Transcript(Transcript),
    Report(NarrativeReport),
}

impl DomainRecord {
    /// Short label for logs
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Recommendations(_) => "recommendations",
            Self::Ticket(_) => "ticket",
            Self::Inventory(_) => "inventory-item",
            Self::Inspection(_) => "inspection",
            Self::Transcript(_) => "transcript",
            Self::Report(_) => "report",
        }
    }
}
