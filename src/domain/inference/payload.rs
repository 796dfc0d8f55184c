//! Loosely typed provider output and the inference result wrapper
//!
//! Every `Raw*` field is optional: the provider is constrained by a schema
//! but not trusted. Type violations (a string where a number belongs, an
//! object where an array belongs) fail parsing; absence is left to the
//! normalizer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::contract::PayloadShape;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRecommendation {
    pub reactant_a: Option<String>,
    pub reactant_b: Option<String>,
    pub reaction_temp: Option<String>,
    pub dose_a: Option<String>,
    pub heat_a: Option<String>,
    pub dose_b: Option<String>,
    pub heat_b: Option<String>,
    pub source: Option<String>,
    pub score: Option<f64>,
    pub details: Option<String>,
    pub is_local: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTicketAnalysis {
    /// Kept in the order the provider listed the fields
    pub core_info: Option<Map<String, Value>>,
    pub validity_check: Option<String>,
    pub cause_match: Option<String>,
    pub recommendations: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInventoryItem {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub spec: Option<String>,
    /// Number or numeric string
    pub quantity: Option<Value>,
    pub unit: Option<String>,
    pub expiry_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInspection {
    pub status: Option<String>,
    pub details: Option<String>,
}

/// Tagged union of structured answers, one variant per shape
#[derive(Debug, Clone, PartialEq)]
pub enum StructuredPayload {
    Recommendations(Vec<RawRecommendation>),
    Ticket(RawTicketAnalysis),
    Inventory(RawInventoryItem),
    Inspection(RawInspection),
}

impl StructuredPayload {
    /// Parse provider JSON into the payload for `shape`
    pub fn parse(shape: PayloadShape, json: &str) -> Result<Self, serde_json::Error> {
        Ok(match shape {
            PayloadShape::RecommendationList => Self::Recommendations(serde_json::from_str(json)?),
            PayloadShape::TicketAnalysis => Self::Ticket(serde_json::from_str(json)?),
            PayloadShape::InventoryItem => Self::Inventory(serde_json::from_str(json)?),
            PayloadShape::Inspection => Self::Inspection(serde_json::from_str(json)?),
        })
    }

    pub fn shape(&self) -> PayloadShape {
        match self {
            Self::Recommendations(_) => PayloadShape::RecommendationList,
            Self::Ticket(_) => PayloadShape::TicketAnalysis,
            Self::Inventory(_) => PayloadShape::InventoryItem,
            Self::Inspection(_) => PayloadShape::Inspection,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ResultPayload {
    Structured(StructuredPayload),
    Text(String),
}

/// Whether the answer was grounded on local lab data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provenance {
    LocalContext,
    #[default]
    External,
}

/// Parsed provider answer
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceResult {
    pub payload: ResultPayload,
    pub provenance: Provenance,
}

impl InferenceResult {
    pub fn structured(payload: StructuredPayload, provenance: Provenance) -> Self {
        Self {
            payload: ResultPayload::Structured(payload),
            provenance,
        }
    }

    pub fn text(text: impl Into<String>, provenance: Provenance) -> Self {
        Self {
            payload: ResultPayload::Text(text.into()),
            provenance,
        }
    }
}
