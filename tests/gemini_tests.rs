//! Gemini adapter tests against a local mock server

use lab_assist::application::ports::{InferenceProvider, ProviderCall, ProviderError};
use lab_assist::application::{Submission, TaskOrchestrator};
use lab_assist::domain::inference::{Language, LocalContext, PromptTemplate};
use lab_assist::domain::records::DomainRecord;
use lab_assist::domain::workspace::Workspace;
use lab_assist::domain::config::{DEFAULT_MODEL_FAST, DEFAULT_MODEL_REASONING};
use lab_assist::infrastructure::{DeviceCapture, GeminiProvider};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoint(server: &MockServer) -> String {
    format!("{}/v1beta", server.uri())
}

fn model_path(model: &str) -> String {
    format!("/v1beta/models/{}:generateContent", model)
}

fn candidate(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "parts": [{ "text": text }] }
        }]
    })
}

fn call(template: PromptTemplate) -> ProviderCall {
    ProviderCall {
        task_kind: template.kind(),
        model_tier: template.model_tier(),
        prompt: "prompt".to_string(),
        media: None,
        language: Language::En,
        contract: template.contract(),
    }
}

#[tokio::test]
async fn returns_first_candidate_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(model_path(DEFAULT_MODEL_FAST)))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Pump 3 is leaking oil")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key").with_endpoint(endpoint(&server));
    let text = provider
        .generate(&call(PromptTemplate::InventoryReport))
        .await
        .unwrap();

    assert_eq!(text.as_deref(), Some("Pump 3 is leaking oil"));
}

#[tokio::test]
async fn structured_call_sends_schema_to_reasoning_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(model_path(DEFAULT_MODEL_REASONING)))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": { "type": "ARRAY" }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("[]")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key").with_endpoint(endpoint(&server));
    let text = provider
        .generate(&call(PromptTemplate::ProcessRecommendation))
        .await
        .unwrap();

    assert_eq!(text.as_deref(), Some("[]"));
}

#[tokio::test]
async fn unauthorized_maps_to_invalid_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("bad-key").with_endpoint(endpoint(&server));
    let err = provider
        .generate(&call(PromptTemplate::TicketExtraction))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::InvalidApiKey));
}

#[tokio::test]
async fn too_many_requests_maps_to_rate_limited() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key").with_endpoint(endpoint(&server));
    let err = provider
        .generate(&call(PromptTemplate::TicketExtraction))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::RateLimited));
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend exploded"))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key").with_endpoint(endpoint(&server));
    let err = provider
        .generate(&call(PromptTemplate::TicketExtraction))
        .await
        .unwrap_err();

    match err {
        ProviderError::ApiError(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("backend exploded"));
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn empty_candidates_yield_no_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key").with_endpoint(endpoint(&server));
    let text = provider
        .generate(&call(PromptTemplate::InventoryReport))
        .await
        .unwrap();

    assert!(text.is_none());
}

#[tokio::test]
async fn error_envelope_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "error": { "message": "model overloaded" } })),
        )
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key").with_endpoint(endpoint(&server));
    let err = provider
        .generate(&call(PromptTemplate::InventoryReport))
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::ApiError(m) if m == "model overloaded"));
}

#[tokio::test]
async fn ticket_flows_through_orchestrator() {
    let server = MockServer::start().await;
    let answer = json!({
        "coreInfo": { "equipment": "Pump 3", "symptom": "oil leak", "blank": "" },
        "validityCheck": "Plausible",
        "causeMatch": "Worn seal matches the symptom",
        "recommendations": ["Replace seal", "Check oil level", "Inspect housing", "Call vendor"]
    });
    Mock::given(method("POST"))
        .and(path(model_path(DEFAULT_MODEL_FAST)))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate(&answer.to_string())))
        .expect(1)
        .mount(&server)
        .await;

    let provider = GeminiProvider::new("test-key").with_endpoint(endpoint(&server));
    let orchestrator = TaskOrchestrator::new(DeviceCapture::microphone(), provider);
    let mut workspace = Workspace::seeded(Language::En);

    let submission = orchestrator
        .submit_text(
            PromptTemplate::TicketExtraction,
            "Pump 3 leaks oil after the seal swap",
            Language::En,
            LocalContext::None,
        )
        .await
        .unwrap();
    let Submission::Settled(settlement) = submission else {
        panic!("expected a settled submission");
    };
    match &settlement.result {
        Ok(DomainRecord::Ticket(ticket)) => {
            assert_eq!(ticket.solutions.len(), 3);
            assert!(ticket.core_info.iter().all(|(_, v)| !v.is_empty()));
        }
        other => panic!("expected ticket, got {:?}", other),
    }
    settlement.apply(&mut workspace).unwrap();
    assert!(workspace.ticket_analysis.is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cli_report_prints_markdown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(model_path(DEFAULT_MODEL_FAST)))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(candidate("## Stock report\n\nReorder NH3.")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let home = tempfile::TempDir::new().unwrap();
    let endpoint = endpoint(&server);
    let home_path = home.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        assert_cmd::Command::cargo_bin("lab-assist")
            .unwrap()
            .env("GEMINI_API_KEY", "test-key")
            .env("LAB_ASSIST_ENDPOINT", endpoint)
            .env("HOME", &home_path)
            .env("XDG_CONFIG_HOME", &home_path)
            .args(["--lang", "en", "inventory", "report"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("## Stock report"));
    assert!(stdout.contains("Reorder NH3."));
}

#[tokio::test]
#[ignore = "requires GEMINI_API_KEY environment variable"]
async fn live_report_with_valid_api_key() {
    let Ok(api_key) = std::env::var("GEMINI_API_KEY") else {
        eprintln!("Skipping test: GEMINI_API_KEY not set");
        return;
    };

    let orchestrator =
        TaskOrchestrator::new(DeviceCapture::microphone(), GeminiProvider::new(api_key));
    let workspace = Workspace::seeded(Language::En);
    let template = PromptTemplate::InventoryReport;
    let submission = orchestrator
        .submit_context(template, Language::En, workspace.context_for(template))
        .await
        .unwrap();

    let Submission::Settled(settlement) = submission else {
        panic!("expected a settled submission");
    };
    assert!(settlement.result.is_ok(), "{:?}", settlement.result);
}
