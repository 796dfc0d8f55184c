//! Expected-shape contracts attached to structured inference calls

use serde_json::{json, Value};

/// MIME type requested for structured answers
pub const JSON_MIME_TYPE: &str = "application/json";

/// Structured answer shapes the gateway knows how to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadShape {
    RecommendationList,
    TicketAnalysis,
    InventoryItem,
    Inspection,
}

impl PayloadShape {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RecommendationList => "recommendation list",
            Self::TicketAnalysis => "ticket analysis",
            Self::InventoryItem => "inventory item",
            Self::Inspection => "inspection",
        }
    }
}

/// Response MIME type plus a schema in the provider's OpenAPI subset
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseContract {
    pub mime_type: &'static str,
    pub schema: Value,
}

impl ResponseContract {
    pub fn for_shape(shape: PayloadShape) -> Self {
        let schema = match shape {
            PayloadShape::RecommendationList => json!({
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "reactantA": { "type": "STRING" },
                        "reactantB": { "type": "STRING" },
                        "reactionTemp": { "type": "STRING" },
                        "doseA": { "type": "STRING" },
                        "heatA": { "type": "STRING" },
                        "doseB": { "type": "STRING" },
                        "heatB": { "type": "STRING" },
                        "source": { "type": "STRING" },
                        "score": { "type": "NUMBER" },
                        "details": { "type": "STRING" },
                        "isLocal": { "type": "BOOLEAN" }
                    },
                    "required": ["reactantA", "reactantB"]
                }
            }),
            PayloadShape::TicketAnalysis => json!({
                "type": "OBJECT",
                "properties": {
                    "coreInfo": {
                        "type": "OBJECT",
                        "properties": {
                            "equipment": { "type": "STRING" },
                            "symptom": { "type": "STRING" },
                            "location": { "type": "STRING" },
                            "reportedAt": { "type": "STRING" }
                        }
                    },
                    "validityCheck": { "type": "STRING" },
                    "causeMatch": { "type": "STRING" },
                    "recommendations": {
                        "type": "ARRAY",
                        "items": { "type": "STRING" }
                    }
                },
                "required": ["coreInfo"]
            }),
            PayloadShape::InventoryItem => json!({
                "type": "OBJECT",
                "properties": {
                    "name": { "type": "STRING" },
                    "brand": { "type": "STRING" },
                    "spec": { "type": "STRING" },
                    "quantity": { "type": "NUMBER" },
                    "unit": { "type": "STRING" },
                    "expiryDate": { "type": "STRING" }
                },
                "required": ["name"]
            }),
            PayloadShape::Inspection => json!({
                "type": "OBJECT",
                "properties": {
                    "status": { "type": "STRING" },
                    "details": { "type": "STRING" }
                },
                "required": ["status"]
            }),
        };

        Self {
            mime_type: JSON_MIME_TYPE,
            schema,
        }
    }
}
