// crates/dummy-forge-providers/src/openai.rs
// ============================================================================
// Module: OpenAI Backend
// Description: Chat completions client with JSON Schema response format.
// Purpose: Generate structured output from OpenAI-family models.
// Dependencies: reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! Sends `POST {base_url}/chat/completions` with bearer auth. The prompt goes
//! in a single `user` message and the response schema is attached as a
//! `json_schema` response format. The first choice's message content is
//! parsed as the structured result.

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
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Name attached to the JSON Schema response format.
pub const RESPONSE_FORMAT_NAME: &str = "dummy_data";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// OpenAI endpoint configuration.
///
/// # Invariants
/// - `max_response_bytes` is a hard upper bound on response bodies.
/// - `timeout_ms` applies to the full request lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OpenAiConfig {
    /// API base URL without the endpoint path.
    pub base_url: String,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            timeout_ms: 60_000,
            max_response_bytes: 4 * 1024 * 1024,
        }
    }
}

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Chat completions request body.
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    /// Provider-side model id.
    model: &'a str,
    /// Conversation messages.
    messages: Vec<ChatMessage<'a>>,
    /// Sampling temperature.
    temperature: f64,
    /// Structured output format.
    response_format: ResponseFormat<'a>,
}

/// Single chat message.
#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    /// Message role.
    role: &'a str,
    /// Message text.
    content: &'a str,
}

/// `json_schema` response format.
#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    /// Format discriminator.
    #[serde(rename = "type")]
    kind: &'a str,
    /// Named schema.
    json_schema: NamedSchema<'a>,
}

/// Schema attached to the response format.
#[derive(Debug, Serialize)]
struct NamedSchema<'a> {
    /// Schema name.
    name: &'a str,
    /// JSON Schema document.
    schema: &'a Value,
    /// Strict schema adherence.
    strict: bool,
}

/// Chat completions response body.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    /// Completion choices.
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

/// Single completion choice.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    /// Assistant message.
    message: ChatResponseMessage,
}

/// Assistant message content.
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    /// Structured output text.
    #[serde(default)]
    content: Option<String>,
    /// Refusal text when the model declined.
    #[serde(default)]
    refusal: Option<String>,
}

// ============================================================================
// SECTION: Backend
// ============================================================================

/// OpenAI chat completions backend.
pub struct OpenAiBackend {
    /// Endpoint configuration.
    config: OpenAiConfig,
    /// HTTP client configured with the request timeout.
    client: reqwest::Client,
}

impl OpenAiBackend {
    /// Creates a backend for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Client`] when the HTTP client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, ProviderError> {
        let client = build_http_client(config.timeout_ms)?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Returns the chat completions endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", normalize_base_url(&self.config.base_url))
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
            .post(self.endpoint())
            .bearer_auth(request.provider.api_key.expose())
            .json(&body);
        let response = send_json(builder, self.config.max_response_bytes).await?;
        extract_structured_output(response)
    }
}

/// Builds the chat completions request body.
fn build_request_body(request: &BackendRequest) -> ChatRequest<'_> {
    ChatRequest {
        model: request.provider.descriptor.model_id,
        messages: vec![ChatMessage {
            role: "user",
            content: &request.prompt,
        }],
        temperature: request.temperature,
        response_format: ResponseFormat {
            kind: "json_schema",
            json_schema: NamedSchema {
                name: RESPONSE_FORMAT_NAME,
                schema: &request.response_schema,
                strict: false,
            },
        },
    }
}

/// Extracts the structured object from a chat completions response.
///
/// # Errors
///
/// Returns [`BackendError::Rejected`] on a refusal and
/// [`BackendError::InvalidResponse`] when no parseable content is present.
pub fn extract_structured_output(response: Value) -> Result<Value, BackendError> {
    let response: ChatResponse = serde_json::from_value(response)
        .map_err(|err| BackendError::InvalidResponse(format!("unexpected response shape: {err}")))?;
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(BackendError::InvalidResponse("response has no choices".to_string()));
    };
    if let Some(refusal) = choice.message.refusal {
        return Err(BackendError::Rejected(format!("model refused: {refusal}")));
    }
    let content = choice
        .message
        .content
        .ok_or_else(|| BackendError::InvalidResponse("message has no content".to_string()))?;
    parse_structured_text(&content)
}
