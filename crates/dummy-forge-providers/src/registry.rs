// crates/dummy-forge-providers/src/registry.rs
// ============================================================================
// Module: Provider Registry
// Description: Static provider table and credential resolution.
// Purpose: Resolve a model key to a concrete, credentialed provider.
// Dependencies: dummy-forge-core, thiserror
// ============================================================================

//! ## Overview
//! The registry is a closed table: one [`ProviderDescriptor`] per
//! [`ModelKey`]. Resolution reads the descriptor's credential from a
//! [`CredentialSource`] and fails when it is absent. There is no fallback
//! from one provider to another.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use dummy_forge_core::ModelKey;
use thiserror::Error;

use crate::credentials::CredentialSource;

// ============================================================================
// SECTION: Descriptors
// ============================================================================

/// Wire protocol family of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderFamily {
    /// OpenAI chat completions API.
    OpenAi,
    /// Google Generative Language API.
    Gemini,
}

/// Static provider metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderDescriptor {
    /// Model key selecting this provider.
    pub key: ModelKey,
    /// Human-readable label returned to callers.
    pub label: &'static str,
    /// Environment variable holding the API key.
    pub credential_var: &'static str,
    /// Provider-side model identifier.
    pub model_id: &'static str,
    /// Wire protocol family.
    pub family: ProviderFamily,
}

/// Provider table, one entry per model key.
pub const PROVIDERS: [ProviderDescriptor; 2] = [
    ProviderDescriptor {
        key: ModelKey::ChatGpt,
        label: "OpenAI GPT-4.1 Mini",
        credential_var: "OPENAI_API_KEY",
        model_id: "gpt-4.1-mini",
        family: ProviderFamily::OpenAi,
    },
    ProviderDescriptor {
        key: ModelKey::Gemini,
        label: "Google Gemini 2.5 Flash",
        credential_var: "GOOGLE_GENERATIVE_AI_API_KEY",
        model_id: "gemini-2.5-flash",
        family: ProviderFamily::Gemini,
    },
];

/// Returns the descriptor for a model key.
#[must_use]
pub const fn descriptor(key: ModelKey) -> &'static ProviderDescriptor {
    match key {
        ModelKey::ChatGpt => &PROVIDERS[0],
        ModelKey::Gemini => &PROVIDERS[1],
    }
}

// ============================================================================
// SECTION: Credentials
// ============================================================================

/// Provider API key.
///
/// # Invariants
/// - `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a raw key.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw key for request signing.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Provider with its credential attached.
#[derive(Debug, Clone)]
pub struct ResolvedProvider {
    /// Static provider metadata.
    pub descriptor: &'static ProviderDescriptor,
    /// API key read at resolution time.
    pub api_key: ApiKey,
}

impl ResolvedProvider {
    /// Returns the provider label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.descriptor.label
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Provider setup errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider's credential is not configured.
    #[error("{label} is not configured on the server.")]
    MissingCredential {
        /// Provider label.
        label: &'static str,
    },
    /// The HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Client(String),
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Resolves model keys against a credential source.
#[derive(Clone)]
pub struct ProviderRegistry {
    /// Source consulted on every resolution.
    credentials: Arc<dyn CredentialSource>,
}

impl ProviderRegistry {
    /// Creates a registry over the given credential source.
    #[must_use]
    pub fn new(credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            credentials,
        }
    }

    /// Resolves a model key to a credentialed provider.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingCredential`] when the credential is
    /// absent or blank.
    pub fn resolve(&self, key: ModelKey) -> Result<ResolvedProvider, ProviderError> {
        let descriptor = descriptor(key);
        let api_key = self.credentials.lookup(descriptor.credential_var).ok_or(
            ProviderError::MissingCredential {
                label: descriptor.label,
            },
        )?;
        Ok(ResolvedProvider {
            descriptor,
            api_key: ApiKey::new(api_key),
        })
    }
}
