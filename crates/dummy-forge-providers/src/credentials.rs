// crates/dummy-forge-providers/src/credentials.rs
// ============================================================================
// Module: Credential Sources
// Description: Lookup of provider API keys by variable name.
// Purpose: Read credentials per request from the environment or a fixed map.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Credentials are looked up on every request so that rotating a key does not
//! require a restart. Empty or whitespace-only values count as absent.

use std::collections::BTreeMap;
use std::env;

/// Source of provider credentials.
pub trait CredentialSource: Send + Sync {
    /// Returns the credential stored under `name`, if any.
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads credentials from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn lookup(&self, name: &str) -> Option<String> {
        env::var(name).ok().and_then(non_blank)
    }
}

/// Fixed credential map used instead of the environment.
///
/// # Invariants
/// - Lookups never fall back to the process environment.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    /// Credential values keyed by variable name.
    values: BTreeMap<String, String>,
}

impl StaticCredentials {
    /// Creates an empty credential map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a credential.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn lookup(&self, name: &str) -> Option<String> {
        self.values.get(name).cloned().and_then(non_blank)
    }
}

/// Treats blank values as missing.
fn non_blank(value: String) -> Option<String> {
    if value.trim().is_empty() { None } else { Some(value) }
}
