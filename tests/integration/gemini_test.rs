//! GeminiProvider against a local stand-in for the generateContent endpoint

use super::common;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use common::test_server::serve;
use scholar::agents::config::LlmProviderConfig;
use scholar::agents::domain::{Content, ToolDefinition};
use scholar::agents::error::LlmError;
use scholar::agents::llm::{GeminiProvider, GenerateRequest, LlmProvider};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Clone)]
struct Stub {
    calls: Arc<AtomicUsize>,
    failures_before_success: usize,
    failure_status: StatusCode,
}

async fn generate_content(
    State(stub): State<Stub>,
    Path(model): Path<String>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let call = stub.calls.fetch_add(1, Ordering::SeqCst);
    if call < stub.failures_before_success {
        return (stub.failure_status, Json(json!({"error": {"message": "try later"}})));
    }

    assert_eq!(model, "gemini-2.5-flash:generateContent");
    let prompt = body["contents"][0]["parts"][0]["text"].clone();

    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "considering", "thought": true},
                        {"text": format!("echo: {}", prompt.as_str().unwrap_or_default())}
                    ]
                },
                "finishReason": "STOP"
            }]
        })),
    )
}

async fn provider(failures: usize, status: StatusCode) -> (GeminiProvider, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/models/:model", post(generate_content))
        .with_state(Stub {
            calls: calls.clone(),
            failures_before_success: failures,
            failure_status: status,
        });
    let (_, base_url) = serve(app).await;

    let config = LlmProviderConfig {
        base_url: Some(base_url),
        max_retry_elapsed_seconds: 10,
        ..LlmProviderConfig::default()
    };
    (GeminiProvider::with_api_key(&config, "test-key").unwrap(), calls)
}

fn request() -> GenerateRequest {
    GenerateRequest {
        model: "gemini-2.5-flash".to_string(),
        system_instruction: "Be a student".to_string(),
        contents: vec![Content::user_text("hello")],
        tools: vec![ToolDefinition::retrieve_notes()],
        include_thoughts: true,
    }
}

#[tokio::test]
async fn test_generate_parses_text_and_thoughts() {
    let (provider, calls) = provider(0, StatusCode::OK).await;

    let response = provider.generate(request()).await.unwrap();

    assert_eq!(response.content.text(), "echo: hello");
    assert!(response.content.parts[0].is_thought());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let (provider, calls) = provider(2, StatusCode::SERVICE_UNAVAILABLE).await;

    let response = provider.generate(request()).await.unwrap();

    assert_eq!(response.content.text(), "echo: hello");
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_client_errors_fail_immediately() {
    let (provider, calls) = provider(1, StatusCode::BAD_REQUEST).await;

    let err = provider.generate(request()).await.unwrap_err();

    assert!(matches!(err, LlmError::Api { status: 400, .. }));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
