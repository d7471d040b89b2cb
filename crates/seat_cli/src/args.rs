// crates/seat_cli/src/args.rs
//
// Offline CLI argument surface.
//
// Rules:
// - No networked paths (reject any scheme:// for every path flag, --out included)
// - Exactly one of: --corporation  XOR  (--elections + --election + --corporation-key)
// - --method is required with --corporation; with --elections it overrides the
//   election's seat-allocation key
// - Optional inputs: --scenario, --feed
// - --validate-only stops after validation and prints the validation report

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use seat_core::LevelingRounding;
use seat_io::looks_like_url_strict;
use thiserror::Error;

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "seats",
    disable_help_subcommand = true,
    about = "Offline, deterministic council-seat apportionment"
)]
pub struct Args {
    // --- Direct mode ---
    /// Corporation JSON (mutually exclusive with --elections).
    #[arg(long, conflicts_with_all = ["elections", "election", "corporation_key"])]
    pub corporation: Option<PathBuf>,
    /// Allocation method key: sainte-lague | rock.
    #[arg(long)]
    pub method: Option<String>,

    // --- Index mode ---
    /// Election index JSON (key → election-name, data-source, seat-allocation).
    #[arg(long)]
    pub elections: Option<PathBuf>,
    /// Key into the election index.
    #[arg(long)]
    pub election: Option<String>,
    /// Key into the election's corporation index.
    #[arg(long)]
    pub corporation_key: Option<String>,

    // --- Optional inputs ---
    /// Scenario JSON (shares, district shares, independent winners).
    #[arg(long)]
    pub scenario: Option<PathBuf>,
    /// Local results-feed snapshot (`;`-delimited).
    #[arg(long)]
    pub feed: Option<PathBuf>,

    /// Rounding of the leveled council size (mixed-member method).
    #[arg(long, default_value = "ceil", value_parser = parse_leveling)]
    pub leveling: LevelingRounding,

    // --- Output & control ---
    /// Output file (default: stdout).
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Validate inputs only; print the validation report.
    #[arg(long)]
    pub validate_only: bool,
    /// Only errors on stderr.
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,
    /// Debug logging on stderr.
    #[arg(long, short)]
    pub verbose: bool,
}

/// Errors surfaced by argument validation. Messages are short and stable.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("invalid flag combination: {0}")]
    BadCombo(&'static str),
    #[error("missing required flag: {0}")]
    Missing(&'static str),
    #[error("path must be a local file (no scheme): {0}")]
    NonLocalPath(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("{0}")]
    Clap(#[from] clap::Error),
}

pub fn parse_leveling(s: &str) -> Result<LevelingRounding, String> {
    s.parse().map_err(|_| format!("expected ceil or floor, got {s:?}"))
}

/// Entry point used by main.rs. Help and version requests exit here.
pub fn parse_and_validate() -> Result<Args, CliError> {
    check(Args::parse())
}

/// Mode, locality and existence checks on already-parsed arguments.
pub fn check(args: Args) -> Result<Args, CliError> {
    for p in iter_all_paths(&args) {
        ensure_local_path(p)?;
    }

    match (&args.corporation, &args.elections) {
        (Some(corp), None) => {
            if args.method.is_none() {
                return Err(CliError::Missing("--method"));
            }
            ensure_local_exists(corp, "--corporation")?;
        }
        (None, Some(idx)) => {
            if args.election.is_none() {
                return Err(CliError::Missing("--election"));
            }
            if args.corporation_key.is_none() {
                return Err(CliError::Missing("--corporation-key"));
            }
            ensure_local_exists(idx, "--elections")?;
        }
        (Some(_), Some(_)) => return Err(CliError::BadCombo("--corporation with --elections")),
        (None, None) => return Err(CliError::Missing("--corporation or --elections")),
    }

    if let Some(s) = &args.scenario {
        ensure_local_exists(s, "--scenario")?;
    }
    if let Some(f) = &args.feed {
        ensure_local_exists(f, "--feed")?;
    }
    Ok(args)
}

fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    let s = p.to_string_lossy();
    if looks_like_url_strict(&s) {
        return Err(CliError::NonLocalPath(s.into_owned()));
    }
    Ok(())
}

fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

fn iter_all_paths(args: &Args) -> impl Iterator<Item = &Path> {
    [
        args.corporation.as_deref(),
        args.elections.as_deref(),
        args.scenario.as_deref(),
        args.feed.as_deref(),
        args.out.as_deref(),
    ]
    .into_iter()
    .flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, CliError> {
        let args = Args::try_parse_from(std::iter::once("seats").chain(argv.iter().copied()))?;
        check(args)
    }

    #[test]
    fn leveling_tokens() {
        assert_eq!(parse_leveling("floor").unwrap(), LevelingRounding::Floor);
        assert!(parse_leveling("round").is_err());
    }

    #[test]
    fn a_mode_is_required() {
        assert!(matches!(parse(&[]), Err(CliError::Missing(_))));
        assert!(matches!(
            parse(&["--elections", "e.json", "--election", "kw"]),
            Err(CliError::Missing("--corporation-key"))
        ));
    }

    #[test]
    fn corporation_needs_a_method() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let path = f.path().to_str().unwrap();
        assert!(matches!(parse(&["--corporation", path]), Err(CliError::Missing("--method"))));
        assert!(parse(&["--corporation", path, "--method", "rock"]).is_ok());
    }

    #[test]
    fn modes_conflict() {
        assert!(matches!(
            parse(&["--corporation", "c.json", "--elections", "e.json"]),
            Err(CliError::Clap(_))
        ));
    }

    #[test]
    fn schemes_are_rejected() {
        assert!(matches!(
            parse(&["--corporation", "https://x/c.json", "--method", "rock"]),
            Err(CliError::NonLocalPath(_))
        ));
        assert!(ensure_local_path(Path::new("/tmp/c.json")).is_ok());
    }

    #[test]
    fn missing_files_are_reported() {
        assert!(matches!(
            parse(&["--corporation", "/nonexistent/c.json", "--method", "rock"]),
            Err(CliError::NotFound(_))
        ));
    }
}
