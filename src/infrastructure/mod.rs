//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with external systems like the Gemini API and cpal.

pub mod capture;
pub mod config;
pub mod inference;

// Re-export adapters
pub use capture::{DeviceCapture, MicrophoneCapture, StillImageCapture};
pub use config::XdgConfigStore;
pub use inference::GeminiProvider;
