// crates/dummy-forge-server/src/server.rs
// ============================================================================
// Module: HTTP Server
// Description: axum endpoint serving `POST /api/dummy`.
// Purpose: Bind configuration to the generation orchestrator over HTTP.
// Dependencies: axum, tokio, dummy-forge-config, dummy-forge-providers
// ============================================================================

//! ## Overview
//! The server exposes a single route, `POST /api/dummy`, that forwards raw
//! request bytes to the [`GenerationOrchestrator`]. Bodies above
//! `server.max_body_bytes` are rejected with 413 before parsing. Inputs are
//! untrusted; all validation happens in the orchestrator.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::DefaultBodyLimit;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::post;
use dummy_forge_config::DummyForgeConfig;
use dummy_forge_core::ErrorBody;
use dummy_forge_providers::EnvCredentials;
use dummy_forge_providers::HttpBackend;
use dummy_forge_providers::ProviderRegistry;
use tokio::net::TcpListener;

use crate::audit::audit_sink_from_config;
use crate::orchestrator::GenerationOrchestrator;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Route served by the generation endpoint.
pub const GENERATION_ROUTE: &str = "/api/dummy";

// ============================================================================
// SECTION: Server
// ============================================================================

/// Dummy Forge HTTP server instance.
pub struct DummyForgeServer {
    /// Validated configuration.
    config: DummyForgeConfig,
    /// Shared generation pipeline.
    orchestrator: Arc<GenerationOrchestrator>,
}

impl DummyForgeServer {
    /// Builds a server from configuration using the HTTP provider backend
    /// and process environment credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when configuration is invalid or a component
    /// cannot be initialized.
    pub fn from_config(config: DummyForgeConfig) -> Result<Self, ServerError> {
        config.validate().map_err(|err| ServerError::Config(err.to_string()))?;
        let backend =
            HttpBackend::new(config.providers.openai.clone(), config.providers.gemini.clone())
                .map_err(|err| ServerError::Init(err.to_string()))?;
        let audit =
            audit_sink_from_config(&config.audit).map_err(|err| ServerError::Init(err.to_string()))?;
        let registry = ProviderRegistry::new(Arc::new(EnvCredentials));
        let orchestrator = GenerationOrchestrator::new(registry, Arc::new(backend))
            .with_generation_config(&config.generation)
            .with_audit_sink(audit)
            .with_payload_logging(config.audit.log_payloads);
        Ok(Self::with_orchestrator(config, Arc::new(orchestrator)))
    }

    /// Builds a server around an existing orchestrator.
    #[must_use]
    pub const fn with_orchestrator(
        config: DummyForgeConfig,
        orchestrator: Arc<GenerationOrchestrator>,
    ) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    /// Returns the axum router for this server.
    #[must_use]
    pub fn router(&self) -> Router {
        router(Arc::clone(&self.orchestrator), self.config.server.max_body_bytes)
    }

    /// Binds the configured address and serves requests.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] when binding or serving fails.
    pub async fn serve(self) -> Result<(), ServerError> {
        let addr =
            self.config.server.bind_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|_| ServerError::Transport("http bind failed".to_string()))?;
        self.serve_on(listener).await
    }

    /// Serves requests on an already bound listener.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Transport`] when the server fails.
    pub async fn serve_on(self, listener: TcpListener) -> Result<(), ServerError> {
        axum::serve(listener, self.router())
            .await
            .map_err(|_| ServerError::Transport("http server failed".to_string()))
    }
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Shared state for the generation handler.
struct ServerState {
    /// Generation pipeline.
    orchestrator: Arc<GenerationOrchestrator>,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

/// Builds the generation router.
#[must_use]
pub fn router(orchestrator: Arc<GenerationOrchestrator>, max_body_bytes: usize) -> Router {
    let state = Arc::new(ServerState {
        orchestrator,
        max_body_bytes,
    });
    Router::new()
        .route(GENERATION_ROUTE, post(handle_generate))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

/// Handles `POST /api/dummy`.
async fn handle_generate(
    State(state): State<Arc<ServerState>>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return payload_too_large();
        }
        Err(_) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                ErrorBody::new("Unable to read request body."),
            );
        }
    };
    if bytes.len() > state.max_body_bytes {
        return payload_too_large();
    }
    match state.orchestrator.generate(bytes.as_ref()).await {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(failure) => error_response(failure.status(), failure.error_body()),
    }
}

/// Builds the 413 response.
fn payload_too_large() -> Response {
    error_response(StatusCode::PAYLOAD_TOO_LARGE, ErrorBody::new("Request body too large."))
}

/// Serializes an error body with a status.
fn error_response(status: StatusCode, body: ErrorBody) -> Response {
    (status, axum::Json(body)).into_response()
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Server startup and transport errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}
