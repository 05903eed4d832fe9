// crates/dummy-forge-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic example for docs and the CLI.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example `dummy-forge.toml`. Every value matches the default, so
//! the example documents defaults as well as keys.

/// Returns a canonical example `dummy-forge.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[server]
bind = "127.0.0.1:8787"
max_body_bytes = 1048576

[generation]
temperature = 0.2
max_retries = 2
initial_backoff_ms = 250
max_backoff_ms = 2000

[providers.openai]
base_url = "https://api.openai.com/v1"
timeout_ms = 60000
max_response_bytes = 4194304

[providers.gemini]
base_url = "https://generativelanguage.googleapis.com/v1beta"
timeout_ms = 60000
max_response_bytes = 4194304

[audit]
sink = "stderr"
# path = "dummy-forge-audit.jsonl"
log_payloads = false
"#,
    )
}
