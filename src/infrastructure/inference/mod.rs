//! Inference provider adapters

mod gemini;

pub use gemini::GeminiProvider;
