//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::capture::CaptureLimit;
use crate::domain::inference::{Language, ModelTier};
use crate::domain::workspace::seed_precursors;

pub const DEFAULT_MODEL_FAST: &str = "gemini-2.5-flash";
pub const DEFAULT_MODEL_REASONING: &str = "gemini-2.5-pro";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub language: Option<String>,
    pub max_duration: Option<String>,
    pub model_fast: Option<String>,
    pub model_reasoning: Option<String>,
    pub endpoint: Option<String>,
    pub precursors: Option<Vec<String>>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            language: Some(Language::default().as_str().to_string()),
            max_duration: Some(CaptureLimit::default().to_string()),
            model_fast: Some(DEFAULT_MODEL_FAST.to_string()),
            model_reasoning: Some(DEFAULT_MODEL_REASONING.to_string()),
            endpoint: Some(DEFAULT_ENDPOINT.to_string()),
            precursors: None,
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_key: other.api_key.or(self.api_key),
            language: other.language.or(self.language),
            max_duration: other.max_duration.or(self.max_duration),
            model_fast: other.model_fast.or(self.model_fast),
            model_reasoning: other.model_reasoning.or(self.model_reasoning),
            endpoint: other.endpoint.or(self.endpoint),
            precursors: other.precursors.or(self.precursors),
        }
    }

    /// Model name for a tier
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => self.model_fast.as_deref().unwrap_or(DEFAULT_MODEL_FAST),
            ModelTier::Reasoning => self
                .model_reasoning
                .as_deref()
                .unwrap_or(DEFAULT_MODEL_REASONING),
        }
    }

    pub fn endpoint_or_default(&self) -> &str {
        self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
    }

    /// Configured precursor library, or the stock one
    pub fn precursors_or_default(&self) -> Vec<String> {
        match &self.precursors {
            Some(list) if !list.is_empty() => list.clone(),
            _ => seed_precursors(),
        }
    }
}
