// crates/seat_cli/src/main.rs
//
// seats: load metadata → build the pipeline input → run → write the canonical report.
// Exit codes: 0 ok, 2 validation/usage, 4 I/O, 5 algorithm invariant.

#![forbid(unsafe_code)]

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    pub const VALIDATION: u8 = 2;
    pub const IO: u8 = 4;
    pub const SPEC: u8 = 5;
}

use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Args};
use seat_core::AllocationMethod;
use seat_io::prelude::*;
use seat_pipeline::{run, validate_only, PipelineError, PipelineInput, SeatReport, ValidationReport};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug, Error)]
enum MainError {
    /// Bad input shape, unknown keys/methods, failed validation.
    #[error("{0}")]
    Validation(String),
    /// Read/write/path failures.
    #[error("{0}")]
    Io(String),
    /// An allocation broke one of its guarantees.
    #[error("{0}")]
    Spec(String),
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("seats: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION);
        }
    };

    init_logging(&args);

    let rc = match run_once(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("seats: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc)
}

/// stderr only. `RUST_LOG` wins unless --verbose/--quiet say otherwise.
/// Returns false when a subscriber was already installed.
fn init_logging(args: &Args) -> bool {
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else if args.quiet {
        EnvFilter::new("error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "keeping the installed tracing subscriber");
            false
        }
    }
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let input = load_input(args)?;

    if args.validate_only {
        let report = validate_only(&input);
        emit(args, &to_value(&report)?)?;
        if !report.pass {
            return Err(MainError::Validation(describe(&report)));
        }
        if !args.quiet {
            eprintln!("validate-only: inputs OK");
        }
        return Ok(());
    }

    let report = run(&input).map_err(map_pipeline_err)?;
    emit(args, &to_value(&report)?)?;
    if !args.quiet {
        eprintln!("{}", summary(&report));
    }
    Ok(())
}

/// Corporation + method, then scenario, feed, and reference-data fallbacks.
fn load_input(args: &Args) -> Result<PipelineInput, MainError> {
    let (corporation, method_key) = match (&args.corporation, &args.elections) {
        (Some(path), _) => {
            let corp = load_corporation(path).map_err(map_io_err)?;
            let key = args
                .method
                .clone()
                .ok_or_else(|| MainError::Validation("missing required flag: --method".into()))?;
            (corp, key)
        }
        (None, Some(index)) => {
            let (Some(election), Some(corp_key)) = (&args.election, &args.corporation_key) else {
                return Err(MainError::Validation(
                    "missing required flag: --election/--corporation-key".into(),
                ));
            };
            let loaded = load_election_context(index, election, corp_key).map_err(map_io_err)?;
            info!(election = %loaded.entry.election_name, corporation = %loaded.corporation.name, "election loaded");
            let key = args
                .method
                .clone()
                .unwrap_or_else(|| loaded.entry.seat_allocation.key.clone());
            (loaded.corporation, key)
        }
        (None, None) => {
            return Err(MainError::Validation(
                "missing required flag: --corporation or --elections".into(),
            ))
        }
    };

    let method: AllocationMethod = method_key
        .parse()
        .map_err(|e| map_pipeline_err(PipelineError::from(e)))?;

    let mut input = PipelineInput::new(corporation, method).with_rounding(args.leveling);

    if let Some(path) = &args.scenario {
        let scenario = load_scenario(path).map_err(map_io_err)?;
        input = input.with_scenario(&scenario);
    }
    if let Some(path) = &args.feed {
        let (rows, bytes) = load_feed(path).map_err(map_io_err)?;
        debug!(sha256 = %sha256_hex(&bytes), rows = rows.len(), "feed snapshot read");
        input = input.with_feed(&rows).map_err(map_pipeline_err)?;
    }
    Ok(input.with_fallbacks())
}

fn to_value<T: serde::Serialize>(doc: &T) -> Result<Value, MainError> {
    serde_json::to_value(doc).map_err(|e| MainError::Io(format!("serialize: {e}")))
}

/// Canonical JSON to --out, or to stdout.
fn emit(args: &Args, value: &Value) -> Result<(), MainError> {
    match &args.out {
        Some(path) => write_out(path, value),
        None => {
            let mut bytes = to_canonical_json_bytes(value);
            bytes.push(b'\n');
            std::io::stdout()
                .lock()
                .write_all(&bytes)
                .map_err(|e| MainError::Io(format!("write stdout: {e}")))
        }
    }
}

fn write_out(path: &Path, value: &Value) -> Result<(), MainError> {
    write_canonical_file(path, value)
        .map_err(|e| MainError::Io(format!("write {}: {e}", path.display())))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

fn summary(report: &SeatReport) -> String {
    let seats: Vec<String> = report
        .parties
        .iter()
        .filter(|p| p.seats > 0)
        .map(|p| format!("{}={}", p.short_name, p.seats))
        .collect();
    let mut line = format!(
        "{} ({}): {} of {} seats [{}]",
        report.corporation,
        report.method,
        report.allocated_total + report.independent_seats,
        report.council_seats,
        seats.join(" ")
    );
    if report.independent_seats > 0 {
        line.push_str(&format!(" + {} independent", report.independent_seats));
    }
    line
}

fn describe(report: &ValidationReport) -> String {
    let lines: Vec<String> = report
        .issues
        .iter()
        .map(|i| format!("{:?} {}: {}", i.severity, i.code, i.message))
        .collect();
    format!("validation failed\n  {}", lines.join("\n  "))
}

fn map_error(e: &MainError) -> u8 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Io(_) => IO,
        MainError::Spec(_) => SPEC,
    }
}

/// Translate seat_io::IoError into MainError buckets.
fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        IoError::Feed(m) => MainError::Validation(format!("feed: {m}")),
        IoError::UrlRejected(m) => MainError::Validation(format!("url not allowed (offline): {m}")),
        IoError::Invalid(m) => MainError::Validation(format!("invalid: {m}")),
        IoError::Path(m) => MainError::Io(format!("path: {m}")),
    }
}

/// Translate seat_pipeline::PipelineError into MainError buckets.
fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Validate(report) => MainError::Validation(describe(&report)),
        PipelineError::Input(m) => MainError::Validation(m),
        PipelineError::Method(e) => MainError::Validation(e.to_string()),
        PipelineError::Allocate(m) => MainError::Spec(m),
        PipelineError::Io(e) => map_io_err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn second_logging_init_is_reported() {
        let args = Args::try_parse_from(["seats", "--quiet"]).unwrap();
        let first = init_logging(&args);
        let second = init_logging(&args);
        assert!(!second);
        // only this test installs a subscriber in the binary's test harness
        assert!(first);
    }
}
