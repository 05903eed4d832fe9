// crates/dummy-forge-server/src/audit.rs
// ============================================================================
// Module: Generation Audit Logging
// Description: Structured audit events for generation requests.
// Purpose: Emit JSON-line audit records without hard dependencies.
// Dependencies: dummy-forge-config, serde, serde_json
// ============================================================================

//! ## Overview
//! Every generation request produces one [`GenerationAuditEvent`]. Request
//! and model payloads are never included unless `audit.log_payloads` is set,
//! in which case a separate [`PayloadAuditEvent`] carries them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use dummy_forge_config::AuditConfig;
use dummy_forge_config::AuditSinkKind;
use dummy_forge_core::ModelKey;
use serde::Serialize;
use serde_json::Value;

use crate::telemetry::GenerationOutcome;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Generation audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Selected model key when known.
    pub model: Option<ModelKey>,
    /// Request outcome.
    pub outcome: GenerationOutcome,
    /// HTTP status returned.
    pub status: u16,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Field count, children included.
    pub total_fields: Option<usize>,
    /// Clamped sample count.
    pub samples: Option<usize>,
    /// Clamped records per sample.
    pub records_per_sample: Option<usize>,
    /// Backend attempts made.
    pub attempts: u32,
    /// Attempt budget allowed by the retry policy.
    pub max_attempts: u32,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Wall-clock latency in milliseconds.
    pub latency_ms: u128,
}

/// Payload audit event (explicit opt-in only).
#[derive(Debug, Clone, Serialize)]
pub struct PayloadAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Selected model key.
    pub model: ModelKey,
    /// Blueprint sent to the model.
    pub blueprint: String,
    /// Skeleton sent to the model.
    pub skeleton: Value,
    /// Raw model response when one was received.
    pub response: Option<Value>,
}

/// Parameters for building a [`GenerationAuditEvent`].
pub struct GenerationAuditParams {
    /// Selected model key when known.
    pub model: Option<ModelKey>,
    /// Request outcome.
    pub outcome: GenerationOutcome,
    /// HTTP status returned.
    pub status: u16,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Field count, children included.
    pub total_fields: Option<usize>,
    /// Clamped sample count.
    pub samples: Option<usize>,
    /// Clamped records per sample.
    pub records_per_sample: Option<usize>,
    /// Backend attempts made.
    pub attempts: u32,
    /// Attempt budget allowed by the retry policy.
    pub max_attempts: u32,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Wall-clock latency in milliseconds.
    pub latency_ms: u128,
}

impl GenerationAuditEvent {
    /// Builds an event stamped with the current time.
    #[must_use]
    pub fn new(params: GenerationAuditParams) -> Self {
        Self {
            event: "dummy_generation",
            timestamp_ms: now_ms(),
            model: params.model,
            outcome: params.outcome,
            status: params.status,
            error_kind: params.error_kind,
            total_fields: params.total_fields,
            samples: params.samples,
            records_per_sample: params.records_per_sample,
            attempts: params.attempts,
            max_attempts: params.max_attempts,
            request_bytes: params.request_bytes,
            latency_ms: params.latency_ms,
        }
    }
}

impl PayloadAuditEvent {
    /// Builds an event stamped with the current time.
    #[must_use]
    pub fn new(model: ModelKey, blueprint: String, skeleton: Value, response: Option<Value>) -> Self {
        Self {
            event: "dummy_generation_payload",
            timestamp_ms: now_ms(),
            model,
            blueprint,
            skeleton,
            response,
        }
    }
}

/// Returns the current time in milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|duration| duration.as_millis()).unwrap_or(0)
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for generation events.
pub trait GenerationAuditSink: Send + Sync {
    /// Record a generation event.
    fn record(&self, event: &GenerationAuditEvent);

    /// Record a payload event.
    fn record_payload(&self, _event: &PayloadAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl GenerationAuditSink for StderrAuditSink {
    fn record(&self, event: &GenerationAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_payload(&self, event: &PayloadAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized line.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl GenerationAuditSink for FileAuditSink {
    fn record(&self, event: &GenerationAuditEvent) {
        self.append(event);
    }

    fn record_payload(&self, event: &PayloadAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl GenerationAuditSink for NoopAuditSink {
    fn record(&self, _event: &GenerationAuditEvent) {}
}

/// Builds the configured audit sink.
///
/// # Errors
///
/// Returns an error when the file sink cannot open its path.
pub fn audit_sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn GenerationAuditSink>> {
    match (config.sink, config.path.as_deref()) {
        (AuditSinkKind::File, Some(path)) => Ok(Arc::new(FileAuditSink::new(Path::new(path))?)),
        (AuditSinkKind::File, None) => {
            Err(io::Error::new(io::ErrorKind::InvalidInput, "audit.sink=file requires audit.path"))
        }
        (AuditSinkKind::Stderr, _) => Ok(Arc::new(StderrAuditSink)),
        (AuditSinkKind::None, _) => Ok(Arc::new(NoopAuditSink)),
    }
}
