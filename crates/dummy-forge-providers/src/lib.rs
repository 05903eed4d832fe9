// crates/dummy-forge-providers/src/lib.rs
// ============================================================================
// Module: Dummy Forge Providers
// Description: Provider registry and generative model backends.
// Purpose: Map model keys to credentials and call provider APIs.
// Dependencies: dummy-forge-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! This crate owns everything that touches a model provider:
//! - [`ProviderRegistry`] maps a [`dummy_forge_core::ModelKey`] to a static
//!   [`ProviderDescriptor`] and reads the credential at call time.
//! - [`GenerationBackend`] is the seam the orchestrator calls.
//!   [`HttpBackend`] routes to [`OpenAiBackend`] or [`GeminiBackend`].
//!
//! Backends classify failures into [`BackendError`] so callers can decide
//! what to retry. Credentials never appear in `Debug` output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod backend;
pub mod credentials;
pub mod gemini;
pub mod openai;
pub mod registry;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use backend::BackendError;
pub use backend::BackendRequest;
pub use backend::GenerationBackend;
pub use backend::HttpBackend;
pub use backend::classify_status;
pub use credentials::CredentialSource;
pub use credentials::EnvCredentials;
pub use credentials::StaticCredentials;
pub use gemini::GeminiBackend;
pub use gemini::GeminiConfig;
pub use openai::OpenAiBackend;
pub use openai::OpenAiConfig;
pub use registry::ApiKey;
pub use registry::PROVIDERS;
pub use registry::ProviderDescriptor;
pub use registry::ProviderError;
pub use registry::ProviderFamily;
pub use registry::ProviderRegistry;
pub use registry::ResolvedProvider;
pub use registry::descriptor;
