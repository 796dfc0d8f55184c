//! Prompt templates, one per inference action the assistant offers

use std::fmt;

use super::contract::{PayloadShape, ResponseContract};
use super::language::Language;
use super::request::LocalContext;
use super::task_kind::TaskKind;
use crate::domain::records::InventoryItem;

/// Which provider model family a template runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelTier {
    /// Slower, stronger model for multi-source reasoning
    Reasoning,
    /// Low-latency model for extraction and transcription
    Fast,
}

/// What a template expects as its primary input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateInput {
    Text,
    Audio,
    Image,
    /// No user payload; the prompt is built from local context alone
    Context,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptTemplate {
    ProcessRecommendation,
    FaultTranscription,
    TicketExtraction,
    InventoryVoiceEntry,
    InventoryLabelScan,
    StorageInspection,
    InventoryReport,
    LabAnalyticsReport,
}

pub const ALL_TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate::ProcessRecommendation,
    PromptTemplate::FaultTranscription,
    PromptTemplate::TicketExtraction,
    PromptTemplate::InventoryVoiceEntry,
    PromptTemplate::InventoryLabelScan,
    PromptTemplate::StorageInspection,
    PromptTemplate::InventoryReport,
    PromptTemplate::LabAnalyticsReport,
];

const INVENTORY_FIELDS: &str = r#"Output JSON object:
- name: string
- brand: string
- spec: string
- quantity: number
- unit: string
- expiryDate: YYYY-MM-DD"#;

impl PromptTemplate {
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::ProcessRecommendation => TaskKind::Recommendation,
            Self::FaultTranscription => TaskKind::Transcription,
            Self::TicketExtraction | Self::InventoryVoiceEntry => TaskKind::Extraction,
            Self::InventoryLabelScan | Self::StorageInspection => TaskKind::ImageAnalysis,
            Self::InventoryReport | Self::LabAnalyticsReport => TaskKind::NarrativeReport,
        }
    }

    pub const fn input(&self) -> TemplateInput {
        match self {
            Self::ProcessRecommendation | Self::TicketExtraction => TemplateInput::Text,
            Self::FaultTranscription | Self::InventoryVoiceEntry => TemplateInput::Audio,
            Self::InventoryLabelScan | Self::StorageInspection => TemplateInput::Image,
            Self::InventoryReport | Self::LabAnalyticsReport => TemplateInput::Context,
        }
    }

    pub const fn model_tier(&self) -> ModelTier {
        match self {
            Self::ProcessRecommendation | Self::LabAnalyticsReport => ModelTier::Reasoning,
            _ => ModelTier::Fast,
        }
    }

    /// Shape the structured answer must have, `None` for prose tasks
    pub const fn shape(&self) -> Option<PayloadShape> {
        match self {
            Self::ProcessRecommendation => Some(PayloadShape::RecommendationList),
            Self::TicketExtraction => Some(PayloadShape::TicketAnalysis),
            Self::InventoryVoiceEntry | Self::InventoryLabelScan => {
                Some(PayloadShape::InventoryItem)
            }
            Self::StorageInspection => Some(PayloadShape::Inspection),
            Self::FaultTranscription | Self::InventoryReport | Self::LabAnalyticsReport => None,
        }
    }

    pub fn contract(&self) -> Option<ResponseContract> {
        self.shape().map(ResponseContract::for_shape)
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ProcessRecommendation => "process-recommendation",
            Self::FaultTranscription => "fault-transcription",
            Self::TicketExtraction => "ticket-extraction",
            Self::InventoryVoiceEntry => "inventory-voice-entry",
            Self::InventoryLabelScan => "inventory-label-scan",
            Self::StorageInspection => "storage-inspection",
            Self::InventoryReport => "inventory-report",
            Self::LabAnalyticsReport => "lab-analytics-report",
        }
    }

    /// Render the full prompt text.
    pub fn render(&self, text: Option<&str>, context: &LocalContext, language: Language) -> String {
        let lang = language.prompt_name();
        let text = text.unwrap_or_default();

        match self {
            Self::ProcessRecommendation => {
                let precursors = context.precursors().join(", ");
                format!(
                    r#"You are an atomic layer deposition (ALD) process expert. For element "{text}", based on the local precursors [{precursors}] and the global literature, recommend deposition processes.
IMPORTANT: Provide all text fields in {lang}.

Output JSON array, each item:
- reactantA: precursor A
- reactantB: reactant B
- reactionTemp: reaction temperature
- doseA: saturated pulse time or dose of A
- heatA: source heating temperature of A
- doseB: saturated pulse time or dose of B
- heatB: source heating temperature of B
- source: literature source title
- score: weighted score (0-100)
- details: analysis process
- isLocal: boolean, true if reactantA matches the local precursor list"#
                )
            }
            Self::FaultTranscription => format!(
                r#"You are an industrial maintenance expert. Transcribe this voice recording into text.
Correct minor spoken errors. Context: equipment fault description or inventory log.
Language: {lang}.
Return ONLY the transcribed text."#
            ),
            Self::TicketExtraction => format!(
                r#"Analyze this maintenance ticket. Extract the core information and judge the cause and the solutions.
Ticket: {text}
IMPORTANT: Provide all response text in {lang}.

Output JSON object:
- coreInfo: object with key-value pairs
- validityCheck: string assessment
- causeMatch: string assessment
- recommendations: string array (top 3, best first)"#
            ),
            Self::InventoryVoiceEntry => format!(
                "Extract laboratory inventory information from this voice note \
                 (reagent name, CAS, spec, quantity). Language: {lang}.\n{INVENTORY_FIELDS}"
            ),
            Self::InventoryLabelScan => format!(
                "Identify the material from this reagent label or shipping invoice image. \
                 Language: {lang}.\n{INVENTORY_FIELDS}"
            ),
            Self::StorageInspection => format!(
                r#"Analyze the status of this laboratory material from a camera frame. Check for leaks, damage, or improper storage.
Output JSON object:
- status: short verdict
- details: explanation
Language: {lang}."#
            ),
            Self::InventoryReport => format!(
                r#"As a smart laboratory warehouse analyst, analyze this inventory:
{}
Apply the rule: "Procurement threshold = consumption_rate * lead_time + safety_stock".
IMPORTANT: Write the response in {lang}. Format in Markdown. Include specific procurement suggestions."#,
                render_inventory(context.inventory())
            ),
            Self::LabAnalyticsReport => format!(
                r#"As a laboratory efficiency specialist, analyze the following:
1. Brand comparison: compare reagent brands on cost and success rate.
2. Energy: optimize storage temperature zones for energy saving.
3. Gas usage: identify potential leaks from consumption trends.
Items:
{}
IMPORTANT: Provide results in {lang} Markdown."#,
                render_inventory(context.inventory())
            ),
        }
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line per item; keeps the prompt compact and independent of serializer output.
fn render_inventory(items: &[InventoryItem]) -> String {
    if items.is_empty() {
        return "(inventory is empty)".to_string();
    }
    items
        .iter()
        .map(|item| {
            format!(
                "- {} | brand: {} | spec: {} | qty: {} {} | expires: {} | health: {} | price: {}",
                item.name,
                item.brand,
                item.spec,
                item.quantity,
                item.unit,
                item.expiry_date,
                item.health,
                item.price
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workspace::seed_inventory;

    #[test]
    fn every_template_maps_to_a_kind_consistent_with_its_shape() {
        for template in ALL_TEMPLATES {
            assert_eq!(
                template.kind().is_structured(),
                template.shape().is_some(),
                "{}",
                template
            );
            assert_eq!(template.contract().is_some(), template.shape().is_some());
        }
    }

    #[test]
    fn recommendation_prompt_lists_precursors_and_language() {
        let context = LocalContext::Precursors(vec!["TiCl4".into(), "H2O".into()]);
        let prompt =
            PromptTemplate::ProcessRecommendation.render(Some("Ti"), &context, Language::En);
        assert!(prompt.contains("\"Ti\""));
        assert!(prompt.contains("[TiCl4, H2O]"));
        assert!(prompt.contains("in English"));
    }

    #[test]
    fn ticket_prompt_embeds_ticket_text() {
        let prompt = PromptTemplate::TicketExtraction.render(
            Some("Pump #3 vibrates"),
            &LocalContext::None,
            Language::Zh,
        );
        assert!(prompt.contains("Ticket: Pump #3 vibrates"));
        assert!(prompt.contains("Chinese"));
    }

    #[test]
    fn report_prompt_renders_inventory_lines() {
        let context = LocalContext::Inventory(seed_inventory());
        let prompt = PromptTemplate::InventoryReport.render(None, &context, Language::En);
        assert!(prompt.contains("NH3 Gas Cylinder"));
        assert!(prompt.contains("health: CRITICAL"));
        assert!(prompt.contains("safety_stock"));
    }

    #[test]
    fn report_prompt_handles_empty_inventory() {
        let prompt =
            PromptTemplate::LabAnalyticsReport.render(None, &LocalContext::None, Language::En);
        assert!(prompt.contains("(inventory is empty)"));
    }

    #[test]
    fn model_tiers() {
        assert_eq!(
            PromptTemplate::ProcessRecommendation.model_tier(),
            ModelTier::Reasoning
        );
        assert_eq!(PromptTemplate::FaultTranscription.model_tier(), ModelTier::Fast);
    }
}
