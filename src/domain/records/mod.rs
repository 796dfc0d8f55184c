//! Domain records and their normalization from provider output

mod inventory;
mod narrative;
mod normalize;
mod recommendation;
mod record;
mod ticket;

pub use inventory::{HealthTier, InventoryItem};
pub use narrative::{InspectionReport, NarrativeReport, Transcript};
pub use normalize::{
    normalize, placeholder_expiry, NormalizeError, DEFAULT_QUANTITY, DEFAULT_UNIT, MAX_SOLUTIONS,
    NOT_ASSESSED, NOT_AVAILABLE,
};
pub use recommendation::{rank, RecommendationRecord};
pub use record::DomainRecord;
pub use ticket::TicketAnalysis;
