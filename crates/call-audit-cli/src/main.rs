// crates/call-audit-cli/src/main.rs
// ============================================================================
// Module: Call Audit CLI Entry Point
// Description: Batch runner for tool-invocation conformance evaluation.
// Purpose: Load record batches, evaluate each entry, and report verdicts.
// Dependencies: call-audit-core, clap, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The Call Audit CLI is the thin shell around the evaluation core: it
//! loads a batch of conversation records from JSON or JSONL, evaluates
//! every record independently, writes the verdict array to disk, and
//! prints a batch summary. Input files are untrusted and size-capped. A
//! record that cannot be decoded becomes a failing verdict keyed by its
//! identifier; only an unreadable input file aborts the run.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsStr;
use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use call_audit_core::ConversationRecord;
use call_audit_core::EntryVerdict;
use call_audit_core::evaluate_entry;
use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of an input batch file.
const MAX_INPUT_BYTES: usize = 64 * 1024 * 1024;

/// Identifier used when a record carries neither `row_idx` nor `id`.
const UNKNOWN_RECORD_ID: &str = "unknown";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "call-audit", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate a batch of conversation records.
    Evaluate(EvaluateCommand),
}

/// Arguments for the `evaluate` command.
#[derive(Args, Debug)]
struct EvaluateCommand {
    /// Input file path (JSON array, single JSON record, or JSONL).
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    /// Output file path for the verdict array.
    #[arg(long, value_name = "PATH", default_value = "results.json")]
    output: PathBuf,
    /// Output format for the batch summary.
    #[arg(long, value_enum, default_value_t = SummaryFormat::Text)]
    format: SummaryFormat,
}

/// Output formats for the batch summary.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum SummaryFormat {
    /// Human-readable summary lines.
    Text,
    /// Machine-readable JSON summary object.
    Json,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a terminal message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Errors returned by bounded file reads.
#[derive(Debug, Error)]
enum ReadLimitError {
    /// File I/O failure.
    #[error("{0}")]
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    #[error("file size {size} exceeds limit of {limit} bytes")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("call-audit {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Evaluate(command) => command_evaluate(&command),
    }
}

/// Prints top-level help when no subcommand is given.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Evaluate Command
// ============================================================================

/// Executes the `evaluate` command.
fn command_evaluate(command: &EvaluateCommand) -> CliResult<ExitCode> {
    let bytes = read_bytes_with_limit(&command.input, MAX_INPUT_BYTES).map_err(|err| {
        CliError::new(format!("failed to read input '{}': {err}", command.input.display()))
    })?;
    let records = load_records(&command.input, &bytes)?;

    let reports: Vec<RecordReport> = records.iter().map(report_for_record).collect();

    let rendered = serde_json::to_string_pretty(&reports)
        .map_err(|err| CliError::new(format!("failed to render results: {err}")))?;
    fs::write(&command.output, rendered).map_err(|err| {
        CliError::new(format!("failed to write results '{}': {err}", command.output.display()))
    })?;

    let summary = BatchSummary::from_reports(&reports);
    match command.format {
        SummaryFormat::Text => {
            for line in summary.render_text(&command.output) {
                write_stdout_line(&line)
                    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            }
        }
        SummaryFormat::Json => {
            let rendered_summary = serde_json::to_string_pretty(&summary)
                .map_err(|err| CliError::new(format!("failed to render summary: {err}")))?;
            write_stdout_line(&rendered_summary)
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Record Loading
// ============================================================================

/// Loads raw record values from JSON or JSONL input bytes.
///
/// JSONL is selected by the `.jsonl` extension; blank lines are skipped. A
/// plain JSON input must be an array of records or a single record object.
fn load_records(path: &Path, bytes: &[u8]) -> CliResult<Vec<Value>> {
    let text = std::str::from_utf8(bytes)
        .map_err(|err| CliError::new(format!("input is not valid UTF-8: {err}")))?;

    if path.extension().and_then(OsStr::to_str) == Some("jsonl") {
        let mut records = Vec::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(line).map_err(|err| {
                CliError::new(format!(
                    "invalid JSON record on line {}: {err}",
                    index.saturating_add(1)
                ))
            })?;
            records.push(record);
        }
        return Ok(records);
    }

    let parsed: Value = serde_json::from_str(text)
        .map_err(|err| CliError::new(format!("invalid JSON input: {err}")))?;
    match parsed {
        Value::Array(records) => Ok(records),
        record @ Value::Object(_) => Ok(vec![record]),
        _ => Err(CliError::new("input must be a JSON array or a JSON record object".to_string())),
    }
}

// ============================================================================
// SECTION: Record Evaluation
// ============================================================================

/// One persisted result: record identifier plus its entry verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct RecordReport {
    /// Record identifier from `row_idx` or `id`.
    id: Value,
    /// Entry-level verdict for the record.
    #[serde(flatten)]
    verdict: EntryVerdict,
}

/// Evaluates one raw record value into a report.
///
/// A record whose `row` fails to decode is converted into a failing verdict
/// carrying a diagnostic instead of interrupting the batch.
fn report_for_record(entry: &Value) -> RecordReport {
    let id = record_identifier(entry);
    let row = entry
        .get("row")
        .cloned()
        .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

    let verdict = match serde_json::from_value::<ConversationRecord>(row) {
        Ok(record) => evaluate_entry(&record),
        Err(err) => {
            let mut failed = EntryVerdict::unevaluated(0);
            failed.errors.push(format!("record evaluation failed: {err}"));
            failed
        }
    };

    RecordReport {
        id,
        verdict,
    }
}

/// Selects the record identifier from `row_idx`, then `id`.
fn record_identifier(entry: &Value) -> Value {
    for key in ["row_idx", "id"] {
        if let Some(value) = entry.get(key) {
            if !value.is_null() {
                return value.clone();
            }
        }
    }
    Value::String(UNKNOWN_RECORD_ID.to_string())
}

// ============================================================================
// SECTION: Batch Summary
// ============================================================================

/// Aggregate pass counts for one evaluated batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct BatchSummary {
    /// Number of evaluated records.
    total: usize,
    /// Records whose entry verdict passed.
    passed: usize,
    /// Records whose entry verdict failed.
    failed: usize,
    /// Records passing the function-identity criterion.
    correct_function_name: usize,
    /// Records passing the argument-validity criterion.
    valid_arguments: usize,
    /// Records passing the undefined-function criterion.
    no_hallucinated_calls: usize,
}

impl BatchSummary {
    /// Builds the summary from a batch of reports.
    fn from_reports(reports: &[RecordReport]) -> Self {
        let count = |criterion: fn(&EntryVerdict) -> bool| {
            reports.iter().filter(|report| criterion(&report.verdict)).count()
        };
        let passed = count(|verdict| verdict.pass);
        Self {
            total: reports.len(),
            passed,
            failed: reports.len().saturating_sub(passed),
            correct_function_name: count(|verdict| verdict.correct_function_name),
            valid_arguments: count(|verdict| verdict.valid_arguments),
            no_hallucinated_calls: count(|verdict| verdict.no_hallucinated_calls),
        }
    }

    /// Renders the human-readable summary lines.
    fn render_text(&self, output: &Path) -> Vec<String> {
        vec![
            "Evaluation summary".to_string(),
            format!("  Total records: {}", self.total),
            format!("  Passed: {} ({})", self.passed, self.percentage(self.passed)),
            format!("  Failed: {} ({})", self.failed, self.percentage(self.failed)),
            "Per-criterion pass counts".to_string(),
            format!("  Correct function name: {}/{}", self.correct_function_name, self.total),
            format!("  Valid arguments: {}/{}", self.valid_arguments, self.total),
            format!("  No hallucinated calls: {}/{}", self.no_hallucinated_calls, self.total),
            format!("Results written to {}", output.display()),
        ]
    }

    /// Formats a count as a percentage of the batch total.
    fn percentage(&self, count: usize) -> String {
        if self.total == 0 {
            return "0.0%".to_string();
        }
        #[allow(
            clippy::cast_precision_loss,
            reason = "Batch counts are far below the f64 integer range."
        )]
        let ratio = count as f64 / self.total as f64;
        format!("{:.1}%", ratio * 100.0)
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Writes a terminal error to stderr and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}

// ============================================================================
// SECTION: Bounded Reads
// ============================================================================

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
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

    let read_limit = limit.saturating_add(1);
    let mut limited = file.take(read_limit);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}
