//! Inference domain module

mod contract;
mod language;
mod payload;
mod request;
mod task_kind;
mod template;

pub use contract::{PayloadShape, ResponseContract, JSON_MIME_TYPE};
pub use language::Language;
pub use payload::{
    InferenceResult, Provenance, RawInspection, RawInventoryItem, RawRecommendation,
    RawTicketAnalysis, ResultPayload, StructuredPayload,
};
pub use request::{InferenceRequest, LocalContext};
pub use task_kind::{TaskKind, ALL_TASK_KINDS};
pub use template::{ModelTier, PromptTemplate, TemplateInput, ALL_TEMPLATES};
