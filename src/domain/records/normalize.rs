//! Normalization of parsed provider output into typed domain records
//!
//! Optional attributes fall back to the documented defaults below. The
//! identifying field of each record is never invented: if it is missing or
//! blank the whole result is rejected and nothing reaches the workspace.

use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use super::inventory::{HealthTier, InventoryItem};
use super::narrative::{InspectionReport, NarrativeReport, Transcript};
use super::recommendation::RecommendationRecord;
use super::record::DomainRecord;
use super::ticket::TicketAnalysis;
use crate::domain::inference::{
    InferenceResult, Provenance, RawInspection, RawInventoryItem, RawRecommendation,
    RawTicketAnalysis, ResultPayload, StructuredPayload, TaskKind,
};

/// Default for absent free-text attributes
pub const NOT_AVAILABLE: &str = "N/A";
/// Default unit of measure
pub const DEFAULT_UNIT: &str = "Unit";
/// Default quantity for a newly registered item
pub const DEFAULT_QUANTITY: f64 = 1.0;
/// Default for absent ticket assessments
pub const NOT_ASSESSED: &str = "Not assessed";
/// Number of ranked solutions kept per ticket
pub const MAX_SOLUTIONS: usize = 3;

/// Far-future expiry used when the provider gives none
pub fn placeholder_expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(2099, 12, 31).unwrap_or(NaiveDate::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("Incomplete {kind} result: missing {field}")]
    IncompleteRecord { kind: TaskKind, field: &'static str },

    #[error("A {found} answer cannot produce a {kind} record")]
    KindMismatch { kind: TaskKind, found: &'static str },
}

/// Map a parsed inference result to the record for `kind`.
pub fn normalize(
    result: &InferenceResult,
    kind: TaskKind,
) -> Result<DomainRecord, NormalizeError> {
    use StructuredPayload as S;

    match (kind, &result.payload) {
        (TaskKind::Recommendation, ResultPayload::Structured(S::Recommendations(items))) => {
            recommendations(items, result.provenance).map(DomainRecord::Recommendations)
        }
        (TaskKind::Extraction, ResultPayload::Structured(S::Ticket(raw))) => {
            ticket(raw).map(DomainRecord::Ticket)
        }
        (
            TaskKind::Extraction | TaskKind::ImageAnalysis,
            ResultPayload::Structured(S::Inventory(raw)),
        ) => inventory_item(raw, kind).map(DomainRecord::Inventory),
        (TaskKind::ImageAnalysis, ResultPayload::Structured(S::Inspection(raw))) => {
            inspection(raw).map(DomainRecord::Inspection)
        }
        (TaskKind::Transcription, ResultPayload::Text(text)) => {
            let text = required(Some(text), kind, "text")?;
            Ok(DomainRecord::Transcript(Transcript { text }))
        }
        (TaskKind::NarrativeReport, ResultPayload::Text(text)) => {
            let markdown = required(Some(text), kind, "report body")?;
            Ok(DomainRecord::Report(NarrativeReport::new(
                markdown,
                result.provenance,
            )))
        }
        (kind, payload) => Err(NormalizeError::KindMismatch {
            kind,
            found: payload_name(payload),
        }),
    }
}

fn recommendations(
    items: &[RawRecommendation],
    provenance: Provenance,
) -> Result<Vec<RecommendationRecord>, NormalizeError> {
    const KIND: TaskKind = TaskKind::Recommendation;

    if items.is_empty() {
        return Err(NormalizeError::IncompleteRecord {
            kind: KIND,
            field: "recommendation list",
        });
    }

    items
        .iter()
        .map(|raw| {
            Ok(RecommendationRecord {
                reactant_a: required(raw.reactant_a.as_ref(), KIND, "reactantA")?,
                reactant_b: required(raw.reactant_b.as_ref(), KIND, "reactantB")?,
                reaction_temp: or_default(raw.reaction_temp.as_ref(), NOT_AVAILABLE),
                dose_a: or_default(raw.dose_a.as_ref(), NOT_AVAILABLE),
                heat_a: or_default(raw.heat_a.as_ref(), NOT_AVAILABLE),
                dose_b: or_default(raw.dose_b.as_ref(), NOT_AVAILABLE),
                heat_b: or_default(raw.heat_b.as_ref(), NOT_AVAILABLE),
                source: or_default(raw.source.as_ref(), NOT_AVAILABLE),
                score: clamp_score(raw.score),
                details: or_default(raw.details.as_ref(), ""),
                // Without local context the provider has nothing to match against.
                is_local: provenance == Provenance::LocalContext && raw.is_local.unwrap_or(false),
            })
        })
        .collect()
}

fn ticket(raw: &RawTicketAnalysis) -> Result<TicketAnalysis, NormalizeError> {
    let core_info: Vec<(String, String)> = raw
        .core_info
        .iter()
        .flatten()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(s) => s.trim().to_string(),
                other => other.to_string(),
            };
            let key = key.trim();
            (!key.is_empty() && !value.is_empty()).then(|| (key.to_string(), value))
        })
        .collect();

    if core_info.is_empty() {
        return Err(NormalizeError::IncompleteRecord {
            kind: TaskKind::Extraction,
            field: "coreInfo",
        });
    }

    let solutions = raw
        .recommendations
        .iter()
        .flatten()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(MAX_SOLUTIONS)
        .map(str::to_string)
        .collect();

    Ok(TicketAnalysis {
        core_info,
        validity_check: or_default(raw.validity_check.as_ref(), NOT_ASSESSED),
        cause_match: or_default(raw.cause_match.as_ref(), NOT_ASSESSED),
        solutions,
    })
}

fn inventory_item(
    raw: &RawInventoryItem,
    kind: TaskKind,
) -> Result<InventoryItem, NormalizeError> {
    let name = required(raw.name.as_ref(), kind, "name")?;

    let expiry_date = match raw.expiry_date.as_deref().map(str::trim) {
        None | Some("") => placeholder_expiry(),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_else(|_| {
            tracing::warn!(item = %name, expiry = s, "unparseable expiry date, using placeholder");
            placeholder_expiry()
        }),
    };

    Ok(InventoryItem {
        id: Uuid::new_v4(),
        name,
        brand: or_default(raw.brand.as_ref(), NOT_AVAILABLE),
        spec: or_default(raw.spec.as_ref(), NOT_AVAILABLE),
        quantity: quantity(raw.quantity.as_ref()),
        unit: or_default(raw.unit.as_ref(), DEFAULT_UNIT),
        expiry_date,
        health: HealthTier::Healthy,
        price: 0.0,
    })
}

fn inspection(raw: &RawInspection) -> Result<InspectionReport, NormalizeError> {
    Ok(InspectionReport {
        status: required(raw.status.as_ref(), TaskKind::ImageAnalysis, "status")?,
        details: or_default(raw.details.as_ref(), NOT_AVAILABLE),
    })
}

fn required(
    value: Option<&String>,
    kind: TaskKind,
    field: &'static str,
) -> Result<String, NormalizeError> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(NormalizeError::IncompleteRecord { kind, field })
}

fn or_default(value: Option<&String>, default: &str) -> String {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
        .to_string()
}

fn clamp_score(score: Option<f64>) -> u8 {
    score
        .filter(|s| s.is_finite())
        .map(|s| s.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0)
}

fn quantity(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|q| q.is_finite() && *q > 0.0)
        .unwrap_or(DEFAULT_QUANTITY)
}

fn payload_name(payload: &ResultPayload) -> &'static str {
    match payload {
        ResultPayload::Text(_) => "free-text",
        ResultPayload::Structured(structured) => structured.shape().as_str(),
    }
}
