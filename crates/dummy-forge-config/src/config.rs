// crates/dummy-forge-config/src/config.rs
// ============================================================================
// Module: Dummy Forge Configuration
// Description: Configuration loading and validation for Dummy Forge.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: dummy-forge-providers, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section has defaults, so an empty file is a valid configuration.
//! Unknown keys are rejected. When no path is given, the
//! `DUMMY_FORGE_CONFIG` variable is consulted, then `dummy-forge.toml` in the
//! working directory; if neither exists the defaults are used.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;
use std::path::PathBuf;

use dummy_forge_providers::GeminiConfig;
use dummy_forge_providers::OpenAiConfig;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "dummy-forge.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "DUMMY_FORGE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Upper bound for `server.max_body_bytes`.
pub(crate) const MAX_BODY_BYTES_LIMIT: usize = 16 * 1024 * 1024;
/// Upper bound for `generation.max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 2;
/// Upper bound for backoff delays in milliseconds.
pub(crate) const MAX_BACKOFF_LIMIT_MS: u64 = 60_000;
/// Upper bound for provider timeouts in milliseconds.
pub(crate) const MAX_PROVIDER_TIMEOUT_MS: u64 = 600_000;
/// Upper bound for provider response limits in bytes.
pub(crate) const MAX_PROVIDER_RESPONSE_BYTES: usize = 64 * 1024 * 1024;

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root configuration for Dummy Forge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DummyForgeConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Generation settings.
    pub generation: GenerationConfig,
    /// Provider endpoint settings.
    pub providers: ProvidersConfig,
    /// Audit logging settings.
    pub audit: AuditConfig,
}

impl DummyForgeConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(resolved) = resolve_path(path)? else {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        };
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.generation.validate()?;
        self.providers.validate()?;
        self.audit.validate()?;
        Ok(())
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Socket address to bind.
    pub bind: String,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Returns the parsed bind address.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the address does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid bind address: {}", self.bind)))
    }

    /// Validates server settings.
    fn validate(&self) -> Result<(), ConfigError> {
        self.bind_addr()?;
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid("server.max_body_bytes must be > 0".to_string()));
        }
        if self.max_body_bytes > MAX_BODY_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "server.max_body_bytes must be <= {MAX_BODY_BYTES_LIMIT}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Generation
// ============================================================================

/// Generation settings shared by all providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Sampling temperature sent to providers.
    pub temperature: f64,
    /// Retries after the first attempt for transient failures.
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds.
    pub initial_backoff_ms: u64,
    /// Upper bound for any retry delay in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_retries: 2,
            initial_backoff_ms: 250,
            max_backoff_ms: 2_000,
        }
    }
}

impl GenerationConfig {
    /// Validates generation settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.temperature.is_finite() || !(0.0 ..= 1.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(
                "generation.temperature must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "generation.max_retries must be <= {MAX_RETRIES_LIMIT}"
            )));
        }
        if self.max_backoff_ms > MAX_BACKOFF_LIMIT_MS {
            return Err(ConfigError::Invalid(format!(
                "generation.max_backoff_ms must be <= {MAX_BACKOFF_LIMIT_MS}"
            )));
        }
        if self.initial_backoff_ms > self.max_backoff_ms {
            return Err(ConfigError::Invalid(
                "generation.initial_backoff_ms must be <= generation.max_backoff_ms".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Providers
// ============================================================================

/// Provider endpoint configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvidersConfig {
    /// OpenAI endpoint.
    pub openai: OpenAiConfig,
    /// Gemini endpoint.
    pub gemini: GeminiConfig,
}

impl ProvidersConfig {
    /// Validates both endpoints.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_endpoint(
            "providers.openai",
            &self.openai.base_url,
            self.openai.timeout_ms,
            self.openai.max_response_bytes,
        )?;
        validate_endpoint(
            "providers.gemini",
            &self.gemini.base_url,
            self.gemini.timeout_ms,
            self.gemini.max_response_bytes,
        )
    }
}

/// Validates a provider endpoint's URL, timeout, and size limit.
fn validate_endpoint(
    section: &str,
    base_url: &str,
    timeout_ms: u64,
    max_response_bytes: usize,
) -> Result<(), ConfigError> {
    let base_url = base_url.trim();
    if !(base_url.starts_with("https://") || base_url.starts_with("http://")) {
        return Err(ConfigError::Invalid(format!(
            "{section}.base_url must start with http:// or https://"
        )));
    }
    if timeout_ms == 0 || timeout_ms > MAX_PROVIDER_TIMEOUT_MS {
        return Err(ConfigError::Invalid(format!(
            "{section}.timeout_ms must be between 1 and {MAX_PROVIDER_TIMEOUT_MS}"
        )));
    }
    if max_response_bytes == 0 || max_response_bytes > MAX_PROVIDER_RESPONSE_BYTES {
        return Err(ConfigError::Invalid(format!(
            "{section}.max_response_bytes must be between 1 and {MAX_PROVIDER_RESPONSE_BYTES}"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Audit
// ============================================================================

/// Audit sink selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSinkKind {
    /// JSON lines on stderr.
    #[default]
    Stderr,
    /// JSON lines appended to a file.
    File,
    /// Audit disabled.
    None,
}

/// Audit logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuditConfig {
    /// Sink receiving audit events.
    pub sink: AuditSinkKind,
    /// Output path for the file sink.
    pub path: Option<String>,
    /// Emit an extra event carrying model output and derived request text.
    pub log_payloads: bool,
}

impl AuditConfig {
    /// Validates audit settings.
    fn validate(&self) -> Result<(), ConfigError> {
        match (self.sink, self.path.as_deref()) {
            (AuditSinkKind::File, None) => {
                Err(ConfigError::Invalid("audit.sink=file requires audit.path".to_string()))
            }
            (AuditSinkKind::File, Some(path)) => validate_path_string("audit.path", path),
            (AuditSinkKind::Stderr | AuditSinkKind::None, Some(_)) => Err(ConfigError::Invalid(
                "audit.path is only valid with audit.sink=file".to_string(),
            )),
            (AuditSinkKind::Stderr | AuditSinkKind::None, None) => Ok(()),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from CLI, environment, or the default file.
///
/// Returns `None` when nothing was requested and the default file is absent.
fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(Some(PathBuf::from(env_path)));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_NAME);
    Ok(default.is_file().then_some(default))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
