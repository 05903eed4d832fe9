// crates/dummy-forge-server/src/telemetry.rs
// ============================================================================
// Module: Generation Telemetry
// Description: Observability hooks for generation requests.
// Purpose: Provide metric events without hard deps.
// Dependencies: dummy-forge-core
// ============================================================================

//! ## Overview
//! A thin metrics interface for generation request counters and latency
//! histograms. Deployments can plug in Prometheus or OpenTelemetry behind
//! [`GenerationMetrics`]. Labels never carry field names or generated data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use dummy_forge_core::ModelKey;
use serde::Serialize;

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Generation request outcome classification.
///
/// # Invariants
/// - Variants are stable for telemetry labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationOutcome {
    /// Generated data was returned.
    Ok,
    /// The request failed.
    Error,
}

impl GenerationOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Error => "error",
        }
    }
}

/// Generation metric event payload.
///
/// # Invariants
/// - `model` is `None` when the request failed before validation finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationMetricEvent {
    /// Selected model key.
    pub model: Option<ModelKey>,
    /// Request outcome.
    pub outcome: GenerationOutcome,
    /// HTTP status returned.
    pub status: u16,
    /// Normalized error kind label.
    pub error_kind: Option<&'static str>,
    /// Backend attempts made.
    pub attempts: u32,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for generation requests and latencies.
pub trait GenerationMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: GenerationMetricEvent);
    /// Records a latency observation for the request.
    fn record_latency(&self, event: GenerationMetricEvent, latency: Duration);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are discarded.
pub struct NoopMetrics;

impl GenerationMetrics for NoopMetrics {
    fn record_request(&self, _event: GenerationMetricEvent) {}

    fn record_latency(&self, _event: GenerationMetricEvent, _latency: Duration) {}
}
