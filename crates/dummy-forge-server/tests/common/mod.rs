// crates/dummy-forge-server/tests/common/mod.rs
// =============================================================================
// Module: Server Test Helpers
// Description: Scripted backends, recording sinks, and payload builders.
// Purpose: Drive the orchestrator without reaching provider APIs.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use async_trait::async_trait;
use dummy_forge_providers::BackendError;
use dummy_forge_providers::BackendRequest;
use dummy_forge_providers::GenerationBackend;
use dummy_forge_providers::ProviderRegistry;
use dummy_forge_providers::StaticCredentials;
use dummy_forge_server::GenerationAuditEvent;
use dummy_forge_server::GenerationAuditSink;
use dummy_forge_server::GenerationMetricEvent;
use dummy_forge_server::GenerationMetrics;
use dummy_forge_server::GenerationOrchestrator;
use dummy_forge_server::PayloadAuditEvent;
use dummy_forge_server::RetryPolicy;
use serde_json::Value;
use serde_json::json;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Scripted Backend
// ============================================================================

/// Backend that replays scripted outcomes and records every call.
#[derive(Default)]
pub struct ScriptedBackend {
    /// Outcomes returned in order.
    script: Mutex<VecDeque<Result<Value, BackendError>>>,
    /// Requests received.
    requests: Mutex<Vec<BackendRequest>>,
    /// Number of calls made.
    calls: AtomicU32,
}

impl ScriptedBackend {
    /// Creates a backend that replays `script` in order.
    pub fn new(script: Vec<Result<Value, BackendError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicU32::new(0),
        })
    }

    /// Returns the number of calls made.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns a copy of the received requests.
    pub fn requests(&self) -> Vec<BackendRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationBackend for ScriptedBackend {
    async fn generate(&self, request: &BackendRequest) -> Result<Value, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::Rejected("script exhausted".to_string())))
    }
}

// ============================================================================
// SECTION: Recording Sinks
// ============================================================================

/// Audit sink that keeps events in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Generation events.
    pub events: Mutex<Vec<GenerationAuditEvent>>,
    /// Payload events.
    pub payloads: Mutex<Vec<PayloadAuditEvent>>,
}

impl GenerationAuditSink for RecordingAuditSink {
    fn record(&self, event: &GenerationAuditEvent) {
        self.events.lock().unwrap().push(event.clone());
    }

    fn record_payload(&self, event: &PayloadAuditEvent) {
        self.payloads.lock().unwrap().push(event.clone());
    }
}

/// Metrics sink that keeps observations in memory.
#[derive(Default)]
pub struct RecordingMetrics {
    /// Request counter events.
    pub requests: Mutex<Vec<GenerationMetricEvent>>,
    /// Latency observations.
    pub latencies: Mutex<Vec<(GenerationMetricEvent, Duration)>>,
}

impl GenerationMetrics for RecordingMetrics {
    fn record_request(&self, event: GenerationMetricEvent) {
        self.requests.lock().unwrap().push(event);
    }

    fn record_latency(&self, event: GenerationMetricEvent, latency: Duration) {
        self.latencies.lock().unwrap().push((event, latency));
    }
}

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Returns a registry with credentials for both providers.
pub fn full_registry() -> ProviderRegistry {
    ProviderRegistry::new(Arc::new(
        StaticCredentials::new()
            .with("OPENAI_API_KEY", "sk-test")
            .with("GOOGLE_GENERATIVE_AI_API_KEY", "g-test"),
    ))
}

/// Returns a registry without any credentials.
pub fn empty_registry() -> ProviderRegistry {
    ProviderRegistry::new(Arc::new(StaticCredentials::new()))
}

/// Builds an orchestrator over `backend` with zero backoff.
pub fn orchestrator(backend: Arc<ScriptedBackend>) -> GenerationOrchestrator {
    GenerationOrchestrator::new(full_registry(), backend)
        .with_retry_policy(RetryPolicy::new(2, Duration::ZERO, Duration::ZERO))
}

/// Builds an `id`/`age` request body.
pub fn id_age_body(model: &str, samples: u64, records: u64) -> Vec<u8> {
    json!({
        "model": model,
        "samples": samples,
        "recordsPerSample": records,
        "fields": [
            { "id": "f1", "name": "id", "type": "string", "value": "" },
            { "id": "f2", "name": "age", "type": "number", "value": "" }
        ]
    })
    .to_string()
    .into_bytes()
}

/// Builds a request body with `count` flat string fields.
pub fn flat_body(count: usize) -> Vec<u8> {
    let fields: Vec<Value> = (0 .. count)
        .map(|index| {
            json!({ "id": format!("f{index}"), "name": format!("field_{index}"), "type": "string", "value": "" })
        })
        .collect();
    json!({ "model": "chatgpt", "samples": 1, "recordsPerSample": 1, "fields": fields })
        .to_string()
        .into_bytes()
}

/// Returns `count` `id`/`age` records.
pub fn id_age_records(count: usize, offset: usize) -> Vec<Value> {
    (0 .. count)
        .map(|index| json!({ "id": format!("rec-{}", offset + index), "age": 20 + offset + index }))
        .collect()
}

/// Builds a well-formed model response.
pub fn model_response(records: usize, alternates: usize) -> Value {
    let alternate_sets: Vec<Value> = (0 .. alternates)
        .map(|set| Value::Array(id_age_records(records, (set + 1) * 100)))
        .collect();
    json!({
        "primaryRecord": id_age_records(records, 0),
        "alternateSamples": alternate_sets,
        "summary": "Generated realistic people.",
        "validationNotes": ["ages are plausible"]
    })
}

// ============================================================================
// SECTION: Fake Provider
// ============================================================================

/// Starts a local server that answers `count` requests with `body`.
/// Returns the base URL.
pub fn fake_provider(count: usize, status: u16, body: String) -> String {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    thread::spawn(move || {
        for _ in 0 .. count {
            let Ok(mut request) = server.recv() else {
                return;
            };
            let mut raw = String::new();
            let _ = request.as_reader().read_to_string(&mut raw);
            let header = Header::from_bytes("Content-Type", "application/json").unwrap();
            let response =
                Response::from_string(body.clone()).with_status_code(status).with_header(header);
            let _ = request.respond(response);
        }
    });
    format!("http://{addr}")
}
