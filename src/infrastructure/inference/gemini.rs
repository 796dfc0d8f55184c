//! Gemini API inference adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::ports::{InferenceProvider, ProviderCall, ProviderError};
use crate::domain::config::{
    AppConfig, DEFAULT_ENDPOINT, DEFAULT_MODEL_FAST, DEFAULT_MODEL_REASONING,
};
use crate::domain::inference::ModelTier;

// Request types for Gemini API

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: i32,
}

// Response types for Gemini API

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Gemini `generateContent` provider
pub struct GeminiProvider {
    api_key: String,
    endpoint: String,
    fast_model: String,
    reasoning_model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Create a provider with the default endpoint and models
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            fast_model: DEFAULT_MODEL_FAST.to_string(),
            reasoning_model: DEFAULT_MODEL_REASONING.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a provider using the endpoint and models from config
    pub fn from_config(api_key: impl Into<String>, config: &AppConfig) -> Self {
        Self {
            endpoint: config.endpoint_or_default().to_string(),
            fast_model: config.model_for(ModelTier::Fast).to_string(),
            reasoning_model: config.model_for(ModelTier::Reasoning).to_string(),
            ..Self::new(api_key)
        }
    }

    /// Point the provider at another base URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn model(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Fast => &self.fast_model,
            ModelTier::Reasoning => &self.reasoning_model,
        }
    }

    fn api_url(&self, tier: ModelTier) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint.trim_end_matches('/'),
            self.model(tier),
            self.api_key
        )
    }

    fn build_request(call: &ProviderCall) -> GenerateContentRequest {
        let mut parts = Vec::with_capacity(2);
        if let Some(media) = &call.media {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: media.mime_type().as_str().to_string(),
                    data: media.data().to_string(),
                }),
            });
        }
        parts.push(Part {
            text: Some(call.prompt.clone()),
            inline_data: None,
        });

        let mut config = GenerationConfig::default();
        if let Some(contract) = &call.contract {
            config.response_mime_type = Some(contract.mime_type.to_string());
            config.response_schema = Some(contract.schema.clone());
        }
        if call.model_tier == ModelTier::Fast {
            // Disable thinking for faster response
            config.thinking_config = Some(ThinkingConfig { thinking_budget: 0 });
        }

        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
            generation_config: Some(config),
        }
    }

    /// Concatenated text parts of the first candidate
    fn extract_text(response: &GenerateContentResponse) -> Option<String> {
        let parts: Vec<&str> = response
            .candidates
            .as_ref()?
            .first()?
            .content
            .as_ref()?
            .parts
            .as_ref()?
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(""))
        }
    }
}

#[async_trait]
impl InferenceProvider for GeminiProvider {
    async fn generate(&self, call: &ProviderCall) -> Result<Option<String>, ProviderError> {
        let body = Self::build_request(call);
        tracing::debug!(
            model = self.model(call.model_tier),
            kind = %call.task_kind,
            language = call.language.as_str(),
            "POST generateContent"
        );

        let response = self
            .client
            .post(self.api_url(call.model_tier))
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::InvalidApiKey);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::ApiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let response: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(ProviderError::ApiError(error.message));
        }

        Ok(Self::extract_text(&response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capture::{EncodedMedia, MediaMimeType};
    use crate::domain::inference::{Language, PromptTemplate};

    fn call(template: PromptTemplate, media: Option<EncodedMedia>) -> ProviderCall {
        ProviderCall {
            task_kind: template.kind(),
            model_tier: template.model_tier(),
            prompt: "prompt".to_string(),
            media,
            language: Language::En,
            contract: template.contract(),
        }
    }

    #[test]
    fn structured_request_carries_schema() {
        let request =
            GeminiProvider::build_request(&call(PromptTemplate::ProcessRecommendation, None));
        let json = serde_json::to_value(&request).unwrap();

        let config = &json["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["type"], "ARRAY");
        // Reasoning tier keeps thinking enabled
        assert!(config.get("thinkingConfig").is_none());
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
    }

    #[test]
    fn media_request_puts_inline_data_first() {
        let media = EncodedMedia::new("ZkxhQw==".to_string(), MediaMimeType::Flac);
        let request =
            GeminiProvider::build_request(&call(PromptTemplate::FaultTranscription, Some(media)));
        let json = serde_json::to_value(&request).unwrap();

        let parts = &json["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], "audio/flac");
        assert_eq!(parts[0]["inlineData"]["data"], "ZkxhQw==");
        assert_eq!(parts[1]["text"], "prompt");

        let config = &json["generationConfig"];
        assert!(config.get("responseSchema").is_none());
        assert_eq!(config["thinkingConfig"]["thinkingBudget"], 0);
    }

    #[test]
    fn api_url_uses_tier_model_and_key() {
        let provider =
            GeminiProvider::new("test-api-key").with_endpoint("http://localhost:9/v1beta/");

        let fast = provider.api_url(ModelTier::Fast);
        assert_eq!(
            fast,
            format!(
                "http://localhost:9/v1beta/models/{}:generateContent?key=test-api-key",
                DEFAULT_MODEL_FAST
            )
        );
        assert!(provider.api_url(ModelTier::Reasoning).contains(DEFAULT_MODEL_REASONING));
    }

    #[test]
    fn config_overrides_models() {
        let config = AppConfig {
            model_fast: Some("custom-flash".to_string()),
            ..Default::default()
        };
        let provider = GeminiProvider::from_config("key", &config);
        assert!(provider.api_url(ModelTier::Fast).contains("custom-flash"));
        assert!(provider.api_url(ModelTier::Fast).starts_with(DEFAULT_ENDPOINT));
    }

    #[test]
    fn extract_text_joins_parts() {
        let response = GenerateContentResponse {
            candidates: Some(vec![Candidate {
                content: Some(CandidateContent {
                    parts: Some(vec![
                        ResponsePart {
                            text: Some("[{\"reactantA\":".to_string()),
                        },
                        ResponsePart {
                            text: Some("\"TiCl4\"}]".to_string()),
                        },
                    ]),
                }),
            }]),
            error: None,
        };

        assert_eq!(
            GeminiProvider::extract_text(&response).as_deref(),
            Some("[{\"reactantA\":\"TiCl4\"}]")
        );
    }

    #[test]
    fn extract_text_empty_response() {
        let response = GenerateContentResponse {
            candidates: None,
            error: None,
        };
        assert!(GeminiProvider::extract_text(&response).is_none());
    }
}
