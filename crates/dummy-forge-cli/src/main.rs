// crates/dummy-forge-cli/src/main.rs
// ============================================================================
// Module: Dummy Forge CLI Entry Point
// Description: Command dispatcher for serving and offline field previews.
// Purpose: Run the HTTP server and inspect field forests without a provider.
// Dependencies: clap, dummy-forge-{config, core, server}, thiserror, tokio.
// ============================================================================

//! ## Overview
//! The `dummy-forge` binary runs the generation server and offers offline
//! tooling: previewing the derivations of a field forest and validating or
//! printing configuration. Preview applies the same validation and field
//! ceiling as the server and never contacts a provider.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use dummy_forge_config::DummyForgeConfig;
use dummy_forge_config::config_toml_example;
use dummy_forge_core::FieldNode;
use dummy_forge_core::PayloadError;
use dummy_forge_core::ValidationDetails;
use dummy_forge_core::build_record_schema;
use dummy_forge_core::build_skeleton;
use dummy_forge_core::enforce_field_limit;
use dummy_forge_core::parse_json_body;
use dummy_forge_core::render_blueprint;
use dummy_forge_core::validate_fields;
use dummy_forge_server::DummyForgeServer;
use dummy_forge_server::GENERATION_ROUTE;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a field forest input.
const MAX_FIELDS_FILE_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "dummy-forge", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP generation server.
    Serve(ServeCommand),
    /// Validate a field forest and print a derivation.
    Preview(PreviewCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `serve`.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Config file path (defaults to `DUMMY_FORGE_CONFIG` or `dummy-forge.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Bind address overriding `server.bind`.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
}

/// Arguments for `preview`.
#[derive(Args, Debug)]
struct PreviewCommand {
    /// JSON file holding a field array or a full request payload.
    #[arg(long, value_name = "PATH")]
    fields: PathBuf,
    /// Derivation to print.
    #[arg(long, value_enum, default_value_t = PreviewFormat::Blueprint)]
    format: PreviewFormat,
}

/// Preview output formats.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum PreviewFormat {
    /// Indented text outline.
    Blueprint,
    /// Illustrative JSON object.
    Skeleton,
    /// JSON Schema for one record.
    Schema,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate configuration.
    Validate(ConfigValidateCommand),
    /// Print the canonical example configuration.
    Example,
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config file path (defaults to `DUMMY_FORGE_CONFIG` or `dummy-forge.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Bounded file read failures.
#[derive(Debug, Error)]
enum ReadLimitError {
    /// Underlying I/O failure.
    #[error("{0}")]
    Io(std::io::Error),
    /// File exceeds the allowed size.
    #[error("file is {size} bytes, limit is {limit} bytes")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed size in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };
    match command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Preview(command) => command_preview(&command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let mut config = DummyForgeConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    if let Some(bind) = command.bind {
        config.server.bind = bind;
    }
    let addr = config
        .server
        .bind_addr()
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    if !addr.ip().is_loopback() {
        write_stderr_line(&format!(
            "warning: binding non-loopback address {addr}; the endpoint has no authentication"
        ))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    let server = DummyForgeServer::from_config(config)
        .map_err(|err| CliError::new(format!("failed to start server: {err}")))?;
    write_stderr_line(&format!("dummy-forge listening on http://{addr}{GENERATION_ROUTE}"))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Preview Command
// ============================================================================

/// Executes the `preview` command.
fn command_preview(command: &PreviewCommand) -> CliResult<ExitCode> {
    let bytes = read_bytes_with_limit(&command.fields, MAX_FIELDS_FILE_BYTES).map_err(|err| {
        CliError::new(format!("failed to read {}: {err}", command.fields.display()))
    })?;
    let fields = parse_forest(&bytes)?;
    let output = render_preview(&fields, command.format)?;
    write_stdout_line(&output).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Parses and validates a forest from raw bytes.
///
/// Accepts a bare field array or a request payload with a `fields` member.
fn parse_forest(bytes: &[u8]) -> CliResult<Vec<FieldNode>> {
    let value = parse_json_body(bytes).map_err(|err| CliError::new(err.to_string()))?;
    let forest = value.get("fields").unwrap_or(&value);
    let fields = validate_fields(forest).map_err(|err| match err {
        PayloadError::Invalid(ref details) => {
            CliError::new(validation_message(&err.to_string(), details))
        }
        PayloadError::Malformed => CliError::new(err.to_string()),
    })?;
    enforce_field_limit(&fields).map_err(|err| CliError::new(err.to_string()))?;
    Ok(fields)
}

/// Renders the selected derivation.
fn render_preview(fields: &[FieldNode], format: PreviewFormat) -> CliResult<String> {
    let value: Value = match format {
        PreviewFormat::Blueprint => return Ok(render_blueprint(fields)),
        PreviewFormat::Skeleton => build_skeleton(fields),
        PreviewFormat::Schema => build_record_schema(fields),
    };
    serde_json::to_string_pretty(&value)
        .map_err(|err| CliError::new(format!("failed to render output: {err}")))
}

/// Formats validation details as one violation per line.
fn validation_message(headline: &str, details: &ValidationDetails) -> String {
    let mut lines = vec![headline.to_string()];
    lines.extend(details.form_errors.iter().map(|message| format!("  {message}")));
    for (path, messages) in &details.field_errors {
        lines.extend(messages.iter().map(|message| format!("  {path}: {message}")));
    }
    lines.join("\n")
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
        ConfigCommand::Example => command_config_example(),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = DummyForgeConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(format!("failed to load config: {err}")))?;
    write_stdout_line("config ok").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Prints the canonical example configuration.
fn command_config_example() -> CliResult<ExitCode> {
    write_stdout_bytes(config_toml_example().as_bytes())
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: I/O Helpers
// ============================================================================

/// Reads a file, refusing anything larger than `max_bytes`.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
