// crates/dummy-forge-providers/tests/common/mod.rs
// =============================================================================
// Module: Provider Test Helpers
// Description: Local HTTP server that records requests and replays responses.
// Purpose: Exercise provider wire formats without reaching real APIs.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::sync::Arc;
use std::sync::mpsc;
use std::sync::mpsc::Receiver;
use std::thread;
use std::thread::JoinHandle;

use dummy_forge_core::ModelKey;
use dummy_forge_providers::BackendRequest;
use dummy_forge_providers::ProviderRegistry;
use dummy_forge_providers::StaticCredentials;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

/// Request observed by the local server.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    /// HTTP method.
    pub method: String,
    /// Request path and query.
    pub url: String,
    /// Headers with lowercase names.
    pub headers: Vec<(String, String)>,
    /// Parsed JSON body, or null.
    pub body: Value,
}

impl CapturedRequest {
    /// Returns the first header value with the given lowercase name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|(field, _)| field == name).map(|(_, value)| value.as_str())
    }
}

/// Local server replaying canned responses in order.
pub struct ReplayServer {
    /// Base URL of the server.
    pub base_url: String,
    /// Captured requests, one per served response.
    pub requests: Receiver<CapturedRequest>,
    /// Server thread handle.
    pub handle: JoinHandle<()>,
}

/// Starts a server that answers each request with the next `(status, body)`.
pub fn replay_server(responses: Vec<(u16, String)>) -> ReplayServer {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let (sender, receiver) = mpsc::channel();
    let handle = thread::spawn(move || {
        for (status, body) in responses {
            let Ok(mut request) = server.recv() else {
                return;
            };
            let mut raw = String::new();
            let _ = request.as_reader().read_to_string(&mut raw);
            let captured = CapturedRequest {
                method: request.method().to_string(),
                url: request.url().to_string(),
                headers: request
                    .headers()
                    .iter()
                    .map(|header| {
                        (header.field.to_string().to_ascii_lowercase(), header.value.to_string())
                    })
                    .collect(),
                body: serde_json::from_str(&raw).unwrap_or(Value::Null),
            };
            let _ = sender.send(captured);
            let content_type =
                Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
            let response =
                Response::from_string(body).with_status_code(status).with_header(content_type);
            let _ = request.respond(response);
        }
    });
    ReplayServer {
        base_url: format!("http://{addr}"),
        requests: receiver,
        handle,
    }
}

/// Builds a backend request for a model key with a test credential.
pub fn backend_request(key: ModelKey) -> BackendRequest {
    let credentials = StaticCredentials::new()
        .with("OPENAI_API_KEY", "sk-test")
        .with("GOOGLE_GENERATIVE_AI_API_KEY", "g-test");
    let provider = ProviderRegistry::new(Arc::new(credentials)).resolve(key).unwrap();
    BackendRequest {
        provider,
        prompt: "Generate records.".to_string(),
        response_schema: sample_schema(),
        temperature: 0.2,
    }
}

/// Small response schema used in wire tests.
pub fn sample_schema() -> Value {
    json!({
        "type": "object",
        "properties": {"summary": {"type": "string"}},
        "required": ["summary"],
    })
}
