// crates/dummy-forge-providers/src/gemini.rs
// ============================================================================
// Module: Gemini Backend
// Description: Generative Language API client with JSON response schema.
// Purpose: Generate structured output from Gemini-family models.
// Dependencies: reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! Sends `POST {base_url}/models/{model}:generateContent` with the API key in
//! the `x-goog-api-key` header. The response schema travels in
//! `generationConfig.responseJsonSchema` with a JSON MIME type. The first
//! candidate's part texts are concatenated and parsed as the result.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::backend::BackendError;
use crate::backend::BackendRequest;
use crate::backend::build_http_client;
use crate::backend::normalize_base_url;
use crate::backend::parse_structured_text;
use crate::backend::send_json;
use crate::registry::ProviderError;

/// Default API base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-goog-api-key";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Gemini endpoint configuration.
///
/// # Invariants
/// - `max_response_bytes` is a hard upper bound on response bodies.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeminiConfig {
    /// API base URL without the model path.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout_ms: 60_000,
            max_response_bytes: 4 * 1024 * 1024,
        }
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// `generateContent` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    /// Conversation contents.
    contents: Vec<Content<'a>>,
    /// Sampling and output configuration.
    generation_config: GenerationConfig<'a>,
}

/// Request content block.
#[derive(Debug, Serialize)]
struct Content<'a> {
    /// Content role.
    role: &'a str,
    /// Content parts.
    parts: Vec<Part<'a>>,
}

/// Request text part.
#[derive(Debug, Serialize)]
struct Part<'a> {
    /// Part text.
    text: &'a str,
}

/// Generation configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    /// Sampling temperature.
    temperature: f64,
    /// Output MIME type.
    response_mime_type: &'a str,
    /// JSON Schema the output must follow.
    response_json_schema: &'a Value,
}

/// `generateContent` response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    /// Response candidates.
    #[serde(default)]
    candidates: Vec<Candidate>,
    /// Prompt feedback when the prompt was blocked.
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

/// Single response candidate.
#[derive(Debug, Deserialize)]
struct Candidate {
    /// Candidate content.
    #[serde(default)]
    content: Option<CandidateContent>,
}

/// Candidate content block.
#[derive(Debug, Deserialize)]
struct CandidateContent {
    /// Content parts.
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

/// Candidate text part.
#[derive(Debug, Deserialize)]
struct CandidatePart {
    /// Part text.
    #[serde(default)]
    text: Option<String>,
}

/// Prompt feedback block.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    /// Reason the prompt was blocked.
    #[serde(default)]
    block_reason: Option<String>,
}

// ============================================================================
// SECTION: Backend
// ============================================================================

/// Gemini `generateContent` backend.
pub struct GeminiBackend {
    /// Endpoint configuration.
    config: GeminiConfig,
    /// HTTP client configured with the request timeout.
    client: reqwest::Client,
}

impl GeminiBackend {
    /// Creates a backend for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Client`] when the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = build_http_client(config.timeout_ms)?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Returns the `generateContent` endpoint URL for a model.
    #[must_use]
    pub fn endpoint(&self, model_id: &str) -> String {
        format!("{}/models/{model_id}:generateContent", normalize_base_url(&self.config.base_url))
    }

    /// Generates a structured object.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the call fails or the output is unusable.
    pub async fn generate(&self, request: &BackendRequest) -> Result<Value, BackendError> {
        let body = build_request_body(request);
        let builder = self
            .client
            .post(self.endpoint(request.provider.descriptor.model_id))
            .header(API_KEY_HEADER, request.provider.api_key.expose())
            .json(&body);
        let response = send_json(builder, self.config.max_response_bytes).await?;
        extract_structured_output(response)
    }
}

/// Builds the `generateContent` request body.
fn build_request_body(request: &BackendRequest) -> GenerateRequest<'_> {
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        generation_config: GenerationConfig {
            temperature: request.temperature,
            response_mime_type: "application/json",
            response_json_schema: &request.response_schema,
        },
    }
}

/// Extracts the structured object from a `generateContent` response.
///
/// # Errors
///
/// Returns [`BackendError::Rejected`] when the prompt was blocked and
/// [`BackendError::InvalidResponse`] when no parseable text is present.
pub fn extract_structured_output(response: Value) -> Result<Value, BackendError> {
    let response: GenerateResponse = serde_json::from_value(response)
        .map_err(|err| BackendError::InvalidResponse(format!("unexpected response shape: {err}")))?;
    if let Some(reason) = response.prompt_feedback.and_then(|feedback| feedback.block_reason) {
        return Err(BackendError::Rejected(format!("prompt blocked: {reason}")));
    }
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(BackendError::InvalidResponse("response has no candidate text".to_string()));
    }
    parse_structured_text(&text)
}
