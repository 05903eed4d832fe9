// crates/dummy-forge-providers/tests/http_backends.rs
// ============================================================================
// Module: HTTP Backend Tests
// Description: Wire-level tests for the OpenAI and Gemini backends.
// Purpose: Verify request shapes, response parsing, and failure classes.
// Dependencies: dummy-forge-providers, tiny_http, tokio
// ============================================================================

//! ## Overview
//! Each test starts a local `tiny_http` server, points a backend at it, and
//! checks the request the backend sent and the result it returned:
//! - Request shape: path, auth header, model, prompt, schema, temperature
//! - Success parsing for both providers
//! - Classification of retryable and non-retryable statuses
//! - Response size limits and connection failures

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::net::TcpListener;

use dummy_forge_core::ModelKey;
use dummy_forge_providers::BackendError;
use dummy_forge_providers::GeminiBackend;
use dummy_forge_providers::GeminiConfig;
use dummy_forge_providers::GenerationBackend;
use dummy_forge_providers::HttpBackend;
use dummy_forge_providers::OpenAiBackend;
use dummy_forge_providers::OpenAiConfig;
use serde_json::json;

use crate::common::backend_request;
use crate::common::replay_server;
use crate::common::sample_schema;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// OpenAI backend pointed at a local base URL.
fn openai_backend(base_url: &str) -> OpenAiBackend {
    OpenAiBackend::new(OpenAiConfig {
        base_url: format!("{base_url}/v1/"),
        timeout_ms: 5_000,
        ..OpenAiConfig::default()
    })
    .unwrap()
}

/// Gemini backend pointed at a local base URL.
fn gemini_backend(base_url: &str) -> GeminiBackend {
    GeminiBackend::new(GeminiConfig {
        base_url: format!("{base_url}/v1beta"),
        timeout_ms: 5_000,
        ..GeminiConfig::default()
    })
    .unwrap()
}

/// Chat completions envelope wrapping a content string.
fn openai_envelope(content: &str) -> String {
    json!({"choices": [{"index": 0, "message": {"role": "assistant", "content": content}}]})
        .to_string()
}

/// Gemini envelope wrapping a single text part.
fn gemini_envelope(text: &str) -> String {
    json!({"candidates": [{"content": {"role": "model", "parts": [{"text": text}]}}]}).to_string()
}

// ============================================================================
// SECTION: OpenAI
// ============================================================================

#[tokio::test]
async fn openai_sends_json_schema_request() {
    let server = replay_server(vec![(200, openai_envelope("{\"summary\":\"done\"}"))]);
    let backend = openai_backend(&server.base_url);

    let output = backend.generate(&backend_request(ModelKey::ChatGpt)).await.unwrap();
    assert_eq!(output, json!({"summary": "done"}));

    let captured = server.requests.recv().unwrap();
    server.handle.join().unwrap();
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.url, "/v1/chat/completions");
    assert_eq!(captured.header("authorization"), Some("Bearer sk-test"));
    assert_eq!(captured.body["model"], json!("gpt-4.1-mini"));
    assert_eq!(captured.body["temperature"], json!(0.2));
    assert_eq!(
        captured.body["messages"],
        json!([{"role": "user", "content": "Generate records."}])
    );
    assert_eq!(
        captured.body["response_format"],
        json!({
            "type": "json_schema",
            "json_schema": {"name": "dummy_data", "schema": sample_schema(), "strict": false},
        })
    );
}

#[tokio::test]
async fn openai_server_errors_are_transient() {
    let server = replay_server(vec![(503, "{\"error\":\"overloaded\"}".to_string())]);
    let backend = openai_backend(&server.base_url);
    let err = backend.generate(&backend_request(ModelKey::ChatGpt)).await.unwrap_err();
    server.handle.join().unwrap();
    assert!(err.is_transient(), "got {err:?}");
}

#[tokio::test]
async fn openai_rate_limits_are_transient() {
    let server = replay_server(vec![(429, String::new())]);
    let backend = openai_backend(&server.base_url);
    let err = backend.generate(&backend_request(ModelKey::ChatGpt)).await.unwrap_err();
    server.handle.join().unwrap();
    assert!(err.is_transient(), "got {err:?}");
}

#[tokio::test]
async fn openai_auth_failures_are_rejected() {
    let server = replay_server(vec![(401, "{\"error\":\"bad key\"}".to_string())]);
    let backend = openai_backend(&server.base_url);
    let err = backend.generate(&backend_request(ModelKey::ChatGpt)).await.unwrap_err();
    server.handle.join().unwrap();
    match err {
        BackendError::Rejected(message) => assert!(message.contains("401"), "{message}"),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn openai_non_json_body_is_invalid() {
    let server = replay_server(vec![(200, "<html>oops</html>".to_string())]);
    let backend = openai_backend(&server.base_url);
    let err = backend.generate(&backend_request(ModelKey::ChatGpt)).await.unwrap_err();
    server.handle.join().unwrap();
    assert!(matches!(err, BackendError::InvalidResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn oversized_responses_are_invalid() {
    let server = replay_server(vec![(200, openai_envelope(&"x".repeat(512)))]);
    let backend = OpenAiBackend::new(OpenAiConfig {
        base_url: server.base_url.clone(),
        timeout_ms: 5_000,
        max_response_bytes: 64,
    })
    .unwrap();
    let err = backend.generate(&backend_request(ModelKey::ChatGpt)).await.unwrap_err();
    drop(server.requests);
    let _ = server.handle.join();
    assert!(matches!(err, BackendError::InvalidResponse(_)), "got {err:?}");
}

#[tokio::test]
async fn connection_failures_are_transient() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let backend = openai_backend(&format!("http://{addr}"));
    let err = backend.generate(&backend_request(ModelKey::ChatGpt)).await.unwrap_err();
    assert!(err.is_transient(), "got {err:?}");
}

// ============================================================================
// SECTION: Gemini
// ============================================================================

#[tokio::test]
async fn gemini_sends_generate_content_request() {
    let server = replay_server(vec![(200, gemini_envelope("{\"summary\":\"done\"}"))]);
    let backend = gemini_backend(&server.base_url);

    let output = backend.generate(&backend_request(ModelKey::Gemini)).await.unwrap();
    assert_eq!(output, json!({"summary": "done"}));

    let captured = server.requests.recv().unwrap();
    server.handle.join().unwrap();
    assert_eq!(captured.method, "POST");
    assert_eq!(captured.url, "/v1beta/models/gemini-2.5-flash:generateContent");
    assert_eq!(captured.header("x-goog-api-key"), Some("g-test"));
    assert_eq!(captured.header("authorization"), None);
    assert_eq!(captured.body["contents"][0]["parts"][0]["text"], json!("Generate records."));
    assert_eq!(
        captured.body["generationConfig"],
        json!({
            "temperature": 0.2,
            "responseMimeType": "application/json",
            "responseJsonSchema": sample_schema(),
        })
    );
}

#[tokio::test]
async fn gemini_bad_request_is_rejected() {
    let server = replay_server(vec![(400, "{\"error\":{\"message\":\"bad schema\"}}".to_string())]);
    let backend = gemini_backend(&server.base_url);
    let err = backend.generate(&backend_request(ModelKey::Gemini)).await.unwrap_err();
    server.handle.join().unwrap();
    assert!(matches!(err, BackendError::Rejected(_)), "got {err:?}");
}

// ============================================================================
// SECTION: Routing
// ============================================================================

#[tokio::test]
async fn http_backend_routes_by_provider_family() {
    let server = replay_server(vec![
        (200, gemini_envelope("{\"summary\":\"gemini\"}")),
        (200, openai_envelope("{\"summary\":\"openai\"}")),
    ]);
    let backend = HttpBackend::new(
        OpenAiConfig {
            base_url: server.base_url.clone(),
            ..OpenAiConfig::default()
        },
        GeminiConfig {
            base_url: server.base_url.clone(),
            ..GeminiConfig::default()
        },
    )
    .unwrap();

    let gemini = backend.generate(&backend_request(ModelKey::Gemini)).await.unwrap();
    let openai = backend.generate(&backend_request(ModelKey::ChatGpt)).await.unwrap();
    assert_eq!(gemini, json!({"summary": "gemini"}));
    assert_eq!(openai, json!({"summary": "openai"}));

    let first = server.requests.recv().unwrap();
    let second = server.requests.recv().unwrap();
    server.handle.join().unwrap();
    assert!(first.url.ends_with(":generateContent"));
    assert_eq!(second.url, "/chat/completions");
}
