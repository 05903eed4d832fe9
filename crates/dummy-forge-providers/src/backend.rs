// crates/dummy-forge-providers/src/backend.rs
// ============================================================================
// Module: Generation Backends
// Description: Backend trait, failure classification, and HTTP routing.
// Purpose: Give the orchestrator one seam for structured model generation.
// Dependencies: async-trait, reqwest, serde_json, thiserror
// ============================================================================

//! ## Overview
//! A [`GenerationBackend`] takes a prompt and a response schema and returns a
//! structured JSON object. Failures are classified so callers can retry only
//! what may succeed on a second attempt:
//! - [`BackendError::Transient`]: timeouts, connection failures, HTTP 408,
//!   429, and 5xx.
//! - [`BackendError::Rejected`]: any other non-success status.
//! - [`BackendError::InvalidResponse`]: oversize, unparseable, or missing
//!   structured output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::gemini::GeminiBackend;
use crate::gemini::GeminiConfig;
use crate::openai::OpenAiBackend;
use crate::openai::OpenAiConfig;
use crate::registry::ProviderError;
use crate::registry::ProviderFamily;
use crate::registry::ResolvedProvider;

/// User agent sent on provider requests.
const USER_AGENT: &str = concat!("dummy-forge/", env!("CARGO_PKG_VERSION"));
/// Maximum characters of an error body quoted in an error message.
const MAX_ERROR_DETAIL_CHARS: usize = 256;

// ============================================================================
// SECTION: Requests and Errors
// ============================================================================

/// Structured generation request sent to a backend.
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// Credentialed provider to call.
    pub provider: ResolvedProvider,
    /// Instruction text.
    pub prompt: String,
    /// JSON Schema the response must follow.
    pub response_schema: Value,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Classified backend failures.
///
/// # Invariants
/// - Only [`BackendError::Transient`] is eligible for retry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Failure that may succeed on retry.
    #[error("provider request failed: {0}")]
    Transient(String),
    /// Provider refused the request.
    #[error("provider rejected the request: {0}")]
    Rejected(String),
    /// Provider answered without usable structured output.
    #[error("provider returned an invalid response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Returns true when the failure may succeed on retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// Returns a stable label for audit records.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transient(_) => "transient",
            Self::Rejected(_) => "rejected",
            Self::InvalidResponse(_) => "invalid_response",
        }
    }
}

// ============================================================================
// SECTION: Backend Trait
// ============================================================================

/// Structured generation backend.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generates a JSON object following `request.response_schema`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] classified by retry eligibility.
    async fn generate(&self, request: &BackendRequest) -> Result<Value, BackendError>;
}

/// Backend that routes requests to the provider's HTTP API.
pub struct HttpBackend {
    /// OpenAI-family client.
    openai: OpenAiBackend,
    /// Gemini-family client.
    gemini: GeminiBackend,
}

impl HttpBackend {
    /// Builds both provider clients.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Client`] when an HTTP client cannot be built.
    pub fn new(openai: OpenAiConfig, gemini: GeminiConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            openai: OpenAiBackend::new(openai)?,
            gemini: GeminiBackend::new(gemini)?,
        })
    }
}

#[async_trait]
impl GenerationBackend for HttpBackend {
    async fn generate(&self, request: &BackendRequest) -> Result<Value, BackendError> {
        match request.provider.descriptor.family {
            ProviderFamily::OpenAi => self.openai.generate(request).await,
            ProviderFamily::Gemini => self.gemini.generate(request).await,
        }
    }
}

// ============================================================================
// SECTION: Classification
// ============================================================================

/// Classifies a non-success HTTP status.
#[must_use]
pub fn classify_status(status: StatusCode, detail: &str) -> BackendError {
    let detail: String = detail.trim().chars().take(MAX_ERROR_DETAIL_CHARS).collect();
    let message = if detail.is_empty() {
        format!("status {status}")
    } else {
        format!("status {status}: {detail}")
    };
    if status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
        || status.is_server_error()
    {
        BackendError::Transient(message)
    } else {
        BackendError::Rejected(message)
    }
}

// ============================================================================
// SECTION: HTTP Helpers
// ============================================================================

/// Builds an HTTP client with the given request timeout.
pub(crate) fn build_http_client(timeout_ms: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| ProviderError::Client(err.to_string()))
}

/// Trims trailing slashes from a configured base URL.
pub(crate) fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Sends a request and parses the JSON body of a successful response.
pub(crate) async fn send_json(
    request: RequestBuilder,
    max_response_bytes: usize,
) -> Result<Value, BackendError> {
    let response =
        request.send().await.map_err(|err| BackendError::Transient(err.to_string()))?;
    let status = response.status();
    let body = read_response_limited(response, max_response_bytes).await?;
    if !status.is_success() {
        return Err(classify_status(status, &String::from_utf8_lossy(&body)));
    }
    serde_json::from_slice(&body)
        .map_err(|err| BackendError::InvalidResponse(format!("response is not json: {err}")))
}

/// Reads a response body while enforcing a hard byte limit.
async fn read_response_limited(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, BackendError> {
    let mut body = Vec::new();
    while let Some(chunk) =
        response.chunk().await.map_err(|err| BackendError::Transient(err.to_string()))?
    {
        let next_total = body.len().saturating_add(chunk.len());
        if next_total > limit {
            return Err(BackendError::InvalidResponse(format!(
                "response exceeds {limit} bytes"
            )));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Parses model text output as a JSON object.
pub(crate) fn parse_structured_text(text: &str) -> Result<Value, BackendError> {
    let value: Value = serde_json::from_str(text.trim()).map_err(|err| {
        BackendError::InvalidResponse(format!("structured output is not json: {err}"))
    })?;
    if value.is_object() {
        Ok(value)
    } else {
        Err(BackendError::InvalidResponse("structured output is not an object".to_string()))
    }
}
