//! In-memory application state owned by the top-level app
//!
//! Nothing here is persisted. Each action writes only its own slot, so
//! results landing out of order never clobber each other.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::inference::{Language, LocalContext, PromptTemplate};
use crate::domain::records::{
    placeholder_expiry, rank, DomainRecord, HealthTier, InspectionReport, InventoryItem,
    NarrativeReport, RecommendationRecord, TicketAnalysis,
};

/// Precursors stocked in the lab when none are configured
pub fn seed_precursors() -> Vec<String> {
    ["Al(CH3)3 (TMA)", "TiCl4", "DEZ", "H2O", "O3", "NH3"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Starting stock of the warehouse
pub fn seed_inventory() -> Vec<InventoryItem> {
    let item = |name: &str,
                brand: &str,
                spec: &str,
                quantity,
                unit: &str,
                expiry: (i32, u32, u32),
                health,
                price| InventoryItem {
        id: Uuid::new_v4(),
        name: name.to_string(),
        brand: brand.to_string(),
        spec: spec.to_string(),
        quantity,
        unit: unit.to_string(),
        expiry_date: NaiveDate::from_ymd_opt(expiry.0, expiry.1, expiry.2)
            .unwrap_or_else(placeholder_expiry),
        health,
        price,
    };

    vec![
        item(
            "Al(CH3)3 (TMA)",
            "Sigma",
            "500ml",
            12.0,
            "Bottle",
            (2024, 12, 1),
            HealthTier::Healthy,
            1200.0,
        ),
        item(
            "NH3 Gas Cylinder",
            "Air Liquide",
            "40L",
            5.0,
            "Cylinder",
            (2023, 11, 15),
            HealthTier::Critical,
            800.0,
        ),
        item(
            "HF 49%",
            "Honeywell",
            "1L",
            8.0,
            "Bottle",
            (2025, 6, 20),
            HealthTier::Healthy,
            150.0,
        ),
        item(
            "Vacuum Filter",
            "Swagelok",
            "2um",
            2.0,
            "Unit",
            (2025, 6, 20),
            HealthTier::Warning,
            450.0,
        ),
    ]
}

#[derive(Debug, Clone)]
pub struct Workspace {
    pub language: Language,
    pub precursors: Vec<String>,
    /// Latest ranked recommendations; each query replaces the last
    pub recommendations: Vec<RecommendationRecord>,
    /// Dictated fault description, one transcript per line
    pub ticket_draft: String,
    pub ticket_analysis: Option<TicketAnalysis>,
    /// Newest first
    pub inventory: Vec<InventoryItem>,
    pub inspection: Option<InspectionReport>,
    pub report: Option<NarrativeReport>,
}

impl Workspace {
    pub fn new(language: Language, precursors: Vec<String>, inventory: Vec<InventoryItem>) -> Self {
        Self {
            language,
            precursors,
            recommendations: Vec::new(),
            ticket_draft: String::new(),
            ticket_analysis: None,
            inventory,
            inspection: None,
            report: None,
        }
    }

    /// Workspace with the stock precursor library and inventory
    pub fn seeded(language: Language) -> Self {
        Self::new(language, seed_precursors(), seed_inventory())
    }

    /// Local data the template is grounded on
    pub fn context_for(&self, template: PromptTemplate) -> LocalContext {
        match template {
            PromptTemplate::ProcessRecommendation => {
                LocalContext::Precursors(self.precursors.clone())
            }
            PromptTemplate::InventoryReport | PromptTemplate::LabAnalyticsReport => {
                LocalContext::Inventory(self.inventory.clone())
            }
            _ => LocalContext::None,
        }
    }

    /// Store a successfully normalized record in its slot
    pub fn apply(&mut self, template: PromptTemplate, record: DomainRecord) {
        match record {
            DomainRecord::Recommendations(mut records) => {
                rank(&mut records);
                self.recommendations = records;
            }
            DomainRecord::Ticket(analysis) => self.ticket_analysis = Some(analysis),
            DomainRecord::Inventory(item) => {
                if template == PromptTemplate::InventoryLabelScan {
                    self.report = Some(NarrativeReport::acceptance_slip(&item, self.language));
                }
                self.inventory.insert(0, item);
            }
            DomainRecord::Inspection(report) => self.inspection = Some(report),
            DomainRecord::Transcript(transcript) => {
                if !self.ticket_draft.is_empty() {
                    self.ticket_draft.push('\n');
                }
                self.ticket_draft.push_str(&transcript.text);
            }
            DomainRecord::Report(report) => self.report = Some(report),
        }
    }
}
