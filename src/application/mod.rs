//! Application layer - Use cases and port interfaces
//!
//! Contains the business logic orchestration and defines
//! interfaces (ports) for external dependencies.

pub mod encoder;
pub mod gateway;
pub mod orchestrator;
pub mod ports;

pub use encoder::{EncodingError, PayloadEncoder};
pub use gateway::{InferenceError, InferenceGateway};
pub use orchestrator::{
    ActionFailure, ActionRejected, CaptureStart, Settlement, Submission, TaskOrchestrator,
};
