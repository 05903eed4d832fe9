// crates/dummy-forge-config/src/lib.rs
// ============================================================================
// Module: Dummy Forge Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for dummy-forge.toml semantics.
// Dependencies: dummy-forge-providers, serde, toml
// ============================================================================

//! ## Overview
//! `dummy-forge-config` defines the configuration model for Dummy Forge. It
//! provides strict, fail-closed validation and a canonical example file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
