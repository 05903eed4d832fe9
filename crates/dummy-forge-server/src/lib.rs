// crates/dummy-forge-server/src/lib.rs
// ============================================================================
// Module: Dummy Forge Server Library
// Description: Generation orchestrator, retry policy, and HTTP endpoint.
// Purpose: Serve `POST /api/dummy` on top of the core pipeline.
// Dependencies: axum, tokio, dummy-forge-{core, providers, config}
// ============================================================================

//! ## Overview
//! `dummy-forge-server` wires the pure core pipeline to a provider backend.
//! [`GenerationOrchestrator`] runs one request end to end under a
//! [`RetryPolicy`]. [`DummyForgeServer`] exposes it over HTTP. Audit and
//! metrics sinks are pluggable and default to no-ops.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod orchestrator;
pub mod retry;
pub mod server;
pub mod telemetry;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::FileAuditSink;
pub use audit::GenerationAuditEvent;
pub use audit::GenerationAuditParams;
pub use audit::GenerationAuditSink;
pub use audit::NoopAuditSink;
pub use audit::PayloadAuditEvent;
pub use audit::StderrAuditSink;
pub use audit::audit_sink_from_config;
pub use orchestrator::GenerationFailure;
pub use orchestrator::GenerationOrchestrator;
pub use retry::RetryPolicy;
pub use server::DummyForgeServer;
pub use server::GENERATION_ROUTE;
pub use server::ServerError;
pub use server::router;
pub use telemetry::GenerationMetricEvent;
pub use telemetry::GenerationMetrics;
pub use telemetry::GenerationOutcome;
pub use telemetry::NoopMetrics;
