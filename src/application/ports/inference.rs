//! Inference provider port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::capture::EncodedMedia;
use crate::domain::inference::{Language, ModelTier, ResponseContract, TaskKind};

/// Provider errors
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    #[error("API error: {0}")]
    ApiError(String),
}

/// One call to the provider
#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub task_kind: TaskKind,
    pub model_tier: ModelTier,
    pub prompt: String,
    pub media: Option<EncodedMedia>,
    /// Already rendered into `prompt`; carried for adapters and logs
    pub language: Language,
    /// Present for structured tasks only
    pub contract: Option<ResponseContract>,
}

/// Port for the external generative model
#[async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Issue exactly one call.
    ///
    /// # Returns
    /// The first candidate's text, or `None` when the provider answered
    /// without content
    async fn generate(&self, call: &ProviderCall) -> Result<Option<String>, ProviderError>;
}
