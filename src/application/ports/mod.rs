//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod config;
pub mod inference;

// Re-export common types
pub use capture::{CaptureError, CaptureHandle, MediaCapture};
pub use config::ConfigStore;
pub use inference::{InferenceProvider, ProviderCall, ProviderError};
