// crates/dummy-forge-cli/tests/cli_commands.rs
// ============================================================================
// Module: CLI Command Tests
// Description: Integration tests for offline CLI commands.
// Purpose: Pin exit codes and output of preview and config commands.
// Dependencies: dummy-forge-cli binary
// ============================================================================
//! ## Overview
//! Runs the `dummy-forge` binary as a subprocess. No command here contacts
//! a provider or binds a socket.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use std::process::Output;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn dummy_forge_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dummy-forge"))
}

fn run_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(dummy_forge_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("DUMMY_FORGE_CONFIG")
        .output()
        .expect("run dummy-forge")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// ============================================================================
// SECTION: Preview
// ============================================================================

#[test]
fn preview_prints_blueprint() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forest.json");
    fs::write(
        &path,
        r#"[{"id":"1","name":"id","type":"string","value":""},{"id":"2","name":"age","type":"number","value":""}]"#,
    )
    .unwrap();

    let output = run_in(dir.path(), &["preview", "--fields", path.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "- id (string)\n- age (number)\n");
}

#[test]
fn preview_prints_schema_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forest.json");
    fs::write(&path, r#"[{"id":"1","name":"active","type":"boolean","value":""}]"#).unwrap();

    let output =
        run_in(dir.path(), &["preview", "--fields", path.to_str().unwrap(), "--format", "schema"]);

    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(schema["properties"]["active"]["type"], "boolean");
}

#[test]
fn preview_fails_on_invalid_forest() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forest.json");
    fs::write(&path, r#"[{"id":"1","name":"","type":"string","value":""}]"#).unwrap();

    let output = run_in(dir.path(), &["preview", "--fields", path.to_str().unwrap()]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    assert!(stderr(&output).contains("fields.0.name"));
}

#[test]
fn preview_fails_on_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["preview", "--fields", "nope.json"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("failed to read nope.json"));
}

// ============================================================================
// SECTION: Config
// ============================================================================

#[test]
fn config_example_round_trips_through_validate() {
    let dir = tempfile::tempdir().unwrap();
    let example = run_in(dir.path(), &["config", "example"]);
    assert!(example.status.success());
    let path = dir.path().join("custom.toml");
    fs::write(&path, &example.stdout).unwrap();

    let output = run_in(dir.path(), &["config", "validate", "--config", path.to_str().unwrap()]);

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "config ok\n");
}

#[test]
fn config_validate_uses_defaults_without_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["config", "validate"]);
    assert!(output.status.success());
}

#[test]
fn config_validate_reads_default_file_in_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("dummy-forge.toml"), "[generation]\nmax_retries = 5\n").unwrap();

    let output = run_in(dir.path(), &["config", "validate"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("failed to load config"));
}

#[test]
fn config_validate_honors_env_override() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("env.toml");
    fs::write(&path, "[server]\nbind = \"not-an-address\"\n").unwrap();

    let output = Command::new(dummy_forge_bin())
        .args(["config", "validate"])
        .current_dir(dir.path())
        .env("DUMMY_FORGE_CONFIG", &path)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn serve_rejects_invalid_bind_before_listening() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &["serve", "--bind", "nowhere"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).starts_with("failed to load config"));
}

#[test]
fn no_arguments_prints_help() {
    let dir = tempfile::tempdir().unwrap();
    let output = run_in(dir.path(), &[]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("preview"));
}
