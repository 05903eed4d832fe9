// crates/dummy-forge-server/src/orchestrator.rs
// ============================================================================
// Module: Generation Orchestrator
// Description: Sequential request pipeline from raw body to generated data.
// Purpose: Validate, bound, shape, invoke, and finalize one generation call.
// Dependencies: dummy-forge-core, dummy-forge-providers, time
// ============================================================================

//! ## Overview
//! [`GenerationOrchestrator::generate`] runs one request through a fixed
//! sequence of stages: parse, validate, bound-check, resolve provider, shape,
//! invoke the backend under the [`RetryPolicy`], then repair, validate and
//! coerce the model output. Every failure maps to exactly one
//! [`GenerationFailure`] and a request never yields partial success.
//!
//! Shared state is read-only; concurrent requests do not interact.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use axum::http::StatusCode;
use dummy_forge_config::GenerationConfig;
use dummy_forge_core::ErrorBody;
use dummy_forge_core::GenerationPlan;
use dummy_forge_core::GenerationResult;
use dummy_forge_core::ModelKey;
use dummy_forge_core::PayloadError;
use dummy_forge_core::ShapeError;
use dummy_forge_core::ValidationDetails;
use dummy_forge_core::enforce_field_limit;
use dummy_forge_core::finalize_response;
use dummy_forge_core::parse_generation_request;
use dummy_forge_core::shape_request;
use dummy_forge_providers::BackendRequest;
use dummy_forge_providers::GenerationBackend;
use dummy_forge_providers::ProviderError;
use dummy_forge_providers::ProviderRegistry;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::audit::GenerationAuditEvent;
use crate::audit::GenerationAuditParams;
use crate::audit::GenerationAuditSink;
use crate::audit::NoopAuditSink;
use crate::audit::PayloadAuditEvent;
use crate::retry::RetryPolicy;
use crate::telemetry::GenerationMetricEvent;
use crate::telemetry::GenerationMetrics;
use crate::telemetry::GenerationOutcome;
use crate::telemetry::NoopMetrics;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Terminal failure of a generation request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    /// Body is not parseable JSON.
    #[error("Unable to parse JSON payload.")]
    MalformedRequest,
    /// Body violates the payload contract or the field ceiling.
    #[error("{message}")]
    Validation {
        /// Human-readable message.
        message: String,
        /// Structured details when available.
        details: Option<ValidationDetails>,
    },
    /// Server-side configuration is incomplete.
    #[error("{0}")]
    Configuration(String),
    /// Backend call or output handling failed.
    #[error("{0}")]
    Generation(String),
}

impl GenerationFailure {
    /// Returns the HTTP status for the failure.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MalformedRequest | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Configuration(_) | Self::Generation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a stable label for audit and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MalformedRequest => "malformed_request",
            Self::Validation { .. } => "validation",
            Self::Configuration(_) => "configuration",
            Self::Generation(_) => "generation",
        }
    }

    /// Builds the wire error body.
    #[must_use]
    pub fn error_body(&self) -> ErrorBody {
        let body = ErrorBody::new(self.to_string());
        match self {
            Self::Validation {
                details: Some(details),
                ..
            } => body.with_details(details.clone()),
            _ => body,
        }
    }
}

impl From<PayloadError> for GenerationFailure {
    fn from(err: PayloadError) -> Self {
        let message = err.to_string();
        match err {
            PayloadError::Malformed => Self::MalformedRequest,
            PayloadError::Invalid(details) => Self::Validation {
                message,
                details: Some(details),
            },
        }
    }
}

impl From<ShapeError> for GenerationFailure {
    fn from(err: ShapeError) -> Self {
        match err {
            ShapeError::FieldLimit {
                ..
            } => Self::Validation {
                message: err.to_string(),
                details: None,
            },
            ShapeError::Serialization(_) => Self::Generation(err.to_string()),
        }
    }
}

impl From<ProviderError> for GenerationFailure {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::MissingCredential {
                ..
            } => Self::Configuration(err.to_string()),
            ProviderError::Client(_) => Self::Generation(err.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Request Trace
// ============================================================================

/// Facts gathered while a request moves through the stages.
#[derive(Debug, Default)]
struct RequestTrace {
    /// Selected model when validation succeeded.
    model: Option<ModelKey>,
    /// Field count when the bound check ran.
    total_fields: Option<usize>,
    /// Clamped sample count once shaped.
    samples: Option<usize>,
    /// Clamped records per sample once shaped.
    records_per_sample: Option<usize>,
    /// Backend attempts made.
    attempts: u32,
}

// ============================================================================
// SECTION: Orchestrator
// ============================================================================

/// Generation pipeline shared across requests.
pub struct GenerationOrchestrator {
    /// Provider lookup against the credential source.
    registry: ProviderRegistry,
    /// Backend used for structured generation.
    backend: Arc<dyn GenerationBackend>,
    /// Retry policy for backend calls.
    retry: RetryPolicy,
    /// Sampling temperature passed to the backend.
    temperature: f64,
    /// Audit sink for per-request events.
    audit: Arc<dyn GenerationAuditSink>,
    /// Metrics sink for per-request observations.
    metrics: Arc<dyn GenerationMetrics>,
    /// Emit payload events when true.
    log_payloads: bool,
}

impl GenerationOrchestrator {
    /// Creates an orchestrator with default policy and no-op sinks.
    #[must_use]
    pub fn new(registry: ProviderRegistry, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            registry,
            backend,
            retry: RetryPolicy::default(),
            temperature: GenerationConfig::default().temperature,
            audit: Arc::new(NoopAuditSink),
            metrics: Arc::new(NoopMetrics),
            log_payloads: false,
        }
    }

    /// Applies temperature and retry settings from configuration.
    #[must_use]
    pub fn with_generation_config(self, config: &GenerationConfig) -> Self {
        self.with_retry_policy(RetryPolicy::from_config(config)).with_temperature(config.temperature)
    }

    /// Replaces the retry policy.
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Replaces the sampling temperature.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, audit: Arc<dyn GenerationAuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn GenerationMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Enables or disables payload audit events.
    #[must_use]
    pub const fn with_payload_logging(mut self, enabled: bool) -> Self {
        self.log_payloads = enabled;
        self
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Runs one generation request from raw body bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationFailure`] for the first stage that fails.
    pub async fn generate(&self, body: &[u8]) -> Result<GenerationResult, GenerationFailure> {
        let started = Instant::now();
        let mut trace = RequestTrace::default();
        let result = self.run(body, &mut trace).await;
        self.observe(&result, &trace, body.len(), started.elapsed());
        result
    }

    /// Executes the stages in order.
    async fn run(
        &self,
        body: &[u8],
        trace: &mut RequestTrace,
    ) -> Result<GenerationResult, GenerationFailure> {
        let request = parse_generation_request(body)?;
        trace.model = Some(request.model);

        trace.total_fields = Some(enforce_field_limit(&request.fields)?);

        let provider = self.registry.resolve(request.model)?;
        let label = provider.label();

        let plan = shape_request(&request)?;
        trace.samples = Some(plan.samples);
        trace.records_per_sample = Some(plan.records_per_sample);

        let backend_request = BackendRequest {
            provider,
            prompt: plan.prompt.clone(),
            response_schema: plan.response_schema.clone(),
            temperature: self.temperature,
        };
        let backend = self.backend.as_ref();
        let request_ref = &backend_request;
        let (outcome, attempts) = self.retry.run(move || backend.generate(request_ref)).await;
        trace.attempts = attempts;

        let raw = match outcome {
            Ok(raw) => raw,
            Err(err) => {
                self.record_payload(&plan, None);
                return Err(GenerationFailure::Generation(err.to_string()));
            }
        };
        if self.log_payloads {
            self.record_payload(&plan, Some(raw.clone()));
        }

        let samples =
            finalize_response(raw, &plan).map_err(|err| GenerationFailure::Generation(err.to_string()))?;
        let submitted_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|err| GenerationFailure::Generation(err.to_string()))?;
        Ok(GenerationResult::new(samples, label, plan.total_fields, submitted_at))
    }

    /// Emits the opt-in payload event.
    fn record_payload(&self, plan: &GenerationPlan, response: Option<Value>) {
        if !self.log_payloads {
            return;
        }
        let event =
            PayloadAuditEvent::new(plan.model, plan.blueprint.clone(), plan.skeleton.clone(), response);
        self.audit.record_payload(&event);
    }

    /// Emits one audit event and one metrics observation.
    fn observe(
        &self,
        result: &Result<GenerationResult, GenerationFailure>,
        trace: &RequestTrace,
        request_bytes: usize,
        latency: Duration,
    ) {
        let (outcome, status, error_kind) = match result {
            Ok(_) => (GenerationOutcome::Ok, StatusCode::OK, None),
            Err(err) => (GenerationOutcome::Error, err.status(), Some(err.kind())),
        };
        let event = GenerationMetricEvent {
            model: trace.model,
            outcome,
            status: status.as_u16(),
            error_kind,
            attempts: trace.attempts,
        };
        self.metrics.record_request(event.clone());
        self.metrics.record_latency(event, latency);
        self.audit.record(&GenerationAuditEvent::new(GenerationAuditParams {
            model: trace.model,
            outcome,
            status: status.as_u16(),
            error_kind,
            total_fields: trace.total_fields,
            samples: trace.samples,
            records_per_sample: trace.records_per_sample,
            attempts: trace.attempts,
            max_attempts: self.retry.max_attempts(),
            request_bytes,
            latency_ms: latency.as_millis(),
        }));
    }
}
