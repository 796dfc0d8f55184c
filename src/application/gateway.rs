//! Inference gateway: request in, parsed result out

use thiserror::Error;

use crate::domain::inference::{
    InferenceRequest, InferenceResult, Provenance, StructuredPayload,
};

use super::ports::{InferenceProvider, ProviderCall, ProviderError};

/// Inference failures, none of which are retried here
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("Provider call failed: {0}")]
    Transport(#[from] ProviderError),

    #[error("Provider answer could not be parsed: {0}")]
    Parse(String),

    #[error("Provider returned no content")]
    Empty,
}

/// Builds the provider call for a request, issues it once and parses the
/// answer. Never caches; identical requests make independent calls.
pub struct InferenceGateway<P: InferenceProvider> {
    provider: P,
}

impl<P: InferenceProvider> InferenceGateway<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub async fn invoke(
        &self,
        request: &InferenceRequest,
    ) -> Result<InferenceResult, InferenceError> {
        let template = request.template();
        let call = ProviderCall {
            task_kind: template.kind(),
            model_tier: template.model_tier(),
            prompt: request.prompt(),
            media: request.media().cloned(),
            language: request.language(),
            contract: template.contract(),
        };

        tracing::debug!(
            template = template.as_str(),
            tier = ?call.model_tier,
            structured = call.contract.is_some(),
            "calling inference provider"
        );

        let answer = self
            .provider
            .generate(&call)
            .await?
            .filter(|text| !text.trim().is_empty())
            .ok_or(InferenceError::Empty)?;

        let provenance = if request.context().is_none() {
            Provenance::External
        } else {
            Provenance::LocalContext
        };

        match template.shape() {
            Some(shape) => {
                let payload = StructuredPayload::parse(shape, strip_code_fence(&answer))
                    .map_err(|e| InferenceError::Parse(e.to_string()))?;
                Ok(InferenceResult::structured(payload, provenance))
            }
            None => Ok(InferenceResult::text(answer.trim(), provenance)),
        }
    }
}

/// Models sometimes wrap JSON in a markdown fence despite the mime type.
fn strip_code_fence(answer: &str) -> &str {
    let trimmed = answer.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // The opening line may carry any info string (`json`, `JSON`, `javascript`).
    let body = body.split_once('\n').map_or(body, |(_, rest)| rest);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inference::{
        Language, LocalContext, PromptTemplate, ResultPayload, TaskKind,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct MockProvider {
        answer: Result<Option<String>, ProviderError>,
        calls: Arc<AtomicUsize>,
        last_call: Arc<Mutex<Option<ProviderCall>>>,
    }

    impl MockProvider {
        fn answering(answer: Result<Option<String>, ProviderError>) -> Self {
            Self {
                answer,
                calls: Arc::new(AtomicUsize::new(0)),
                last_call: Arc::new(Mutex::new(None)),
            }
        }
    }

    #[async_trait]
    impl InferenceProvider for MockProvider {
        async fn generate(&self, call: &ProviderCall) -> Result<Option<String>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_call.lock().unwrap() = Some(call.clone());
            self.answer.clone()
        }
    }

    fn recommendation_request() -> InferenceRequest {
        InferenceRequest::from_text(
            PromptTemplate::ProcessRecommendation,
            "Ti",
            Language::En,
            LocalContext::Precursors(vec!["TiCl4".to_string()]),
        )
        .unwrap()
    }

    fn ticket_request() -> InferenceRequest {
        InferenceRequest::from_text(
            PromptTemplate::TicketExtraction,
            "Chamber 2 pressure spikes at 150C",
            Language::Zh,
            LocalContext::None,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn structured_call_carries_contract_and_parses() {
        let provider = MockProvider::answering(Ok(Some(
            r#"[{"reactantA":"TiCl4","reactantB":"H2O","score":91,"isLocal":true}]"#.to_string(),
        )));
        let last_call = Arc::clone(&provider.last_call);
        let gateway = InferenceGateway::new(provider);

        let result = gateway.invoke(&recommendation_request()).await.unwrap();

        assert_eq!(result.provenance, Provenance::LocalContext);
        assert!(matches!(
            result.payload,
            ResultPayload::Structured(StructuredPayload::Recommendations(ref items))
                if items.len() == 1
        ));

        let call = last_call.lock().unwrap().clone().unwrap();
        assert_eq!(call.task_kind, TaskKind::Recommendation);
        assert!(call.contract.is_some());
        assert!(call.prompt.contains("TiCl4"));
        assert_eq!(call.language, Language::En);
    }

    #[tokio::test]
    async fn malformed_json_is_a_parse_error() {
        let gateway = InferenceGateway::new(MockProvider::answering(Ok(Some(
            "{\"coreInfo\": {\"pump\": ".to_string(),
        ))));
        let err = gateway.invoke(&ticket_request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Parse(_)));
    }

    #[tokio::test]
    async fn wrong_root_type_is_a_parse_error() {
        let gateway = InferenceGateway::new(MockProvider::answering(Ok(Some(
            r#"{"reactantA":"TiCl4"}"#.to_string(),
        ))));
        let err = gateway.invoke(&recommendation_request()).await.unwrap_err();
        assert!(matches!(err, InferenceError::Parse(_)));
    }

    #[tokio::test]
    async fn missing_or_blank_content_is_empty() {
        for answer in [None, Some("  \n".to_string())] {
            let gateway = InferenceGateway::new(MockProvider::answering(Ok(answer)));
            let err = gateway.invoke(&ticket_request()).await.unwrap_err();
            assert!(matches!(err, InferenceError::Empty));
        }
    }

    #[tokio::test]
    async fn provider_failure_is_transport_and_not_retried() {
        let provider = MockProvider::answering(Err(ProviderError::RateLimited));
        let calls = Arc::clone(&provider.calls);
        let gateway = InferenceGateway::new(provider);

        let err = gateway.invoke(&ticket_request()).await.unwrap_err();

        assert!(matches!(err, InferenceError::Transport(ProviderError::RateLimited)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn identical_requests_are_not_cached() {
        let provider = MockProvider::answering(Ok(Some(r#"{"coreInfo":{"a":"b"}}"#.to_string())));
        let calls = Arc::clone(&provider.calls);
        let gateway = InferenceGateway::new(provider);

        let request = ticket_request();
        gateway.invoke(&request).await.unwrap();
        gateway.invoke(&request).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn prose_answer_is_trimmed_text() {
        let gateway = InferenceGateway::new(MockProvider::answering(Ok(Some(
            "\n## Stock summary\nAll good.\n".to_string(),
        ))));
        let request = InferenceRequest::from_context(
            PromptTemplate::InventoryReport,
            LocalContext::Inventory(vec![]),
            Language::En,
        )
        .unwrap();

        let result = gateway.invoke(&request).await.unwrap();

        assert_eq!(
            result.payload,
            ResultPayload::Text("## Stock summary\nAll good.".to_string())
        );
        assert_eq!(result.provenance, Provenance::LocalContext);
    }

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fence("  {\"a\":1} "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```{\"a\":1}```"), "{\"a\":1}");
    }

    #[test]
    fn strips_fences_with_any_info_string() {
        assert_eq!(strip_code_fence("```JSON\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```javascript\n[1, 2]\n```\n"), "[1, 2]");
        assert_eq!(strip_code_fence("``` json \r\n{}\r\n```"), "{}");
    }
}
