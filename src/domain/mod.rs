//! Domain layer - Core business logic
//!
//! Contains value objects, records, the action state machine and domain
//! errors. This layer has no dependencies on external systems.

pub mod action;
pub mod capture;
pub mod config;
pub mod error;
pub mod inference;
pub mod records;
pub mod workspace;

// Re-export common types
pub use action::{ActionSession, ActionSlot, ActionState, FailureKind, Outcome};
pub use capture::{CaptureKind, CaptureLimit, CapturedMedia, EncodedMedia, MediaMimeType};
pub use config::AppConfig;
pub use error::*;
pub use inference::{InferenceRequest, InferenceResult, Language, PromptTemplate, TaskKind};
pub use records::DomainRecord;
pub use workspace::Workspace;
