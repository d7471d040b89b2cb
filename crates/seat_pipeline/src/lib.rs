//! seat_pipeline: deterministic pipeline surface
//! (inputs → normalize → validate → districts → allocate → candidates → build).
//!
//! This crate stays I/O-free: files are read by the caller through `seat_io`,
//! math lives in `seat_algo`. `run` is pure and synchronous; calling it twice on
//! the same input yields byte-identical reports.

#![forbid(unsafe_code)]

use std::collections::{BTreeMap, BTreeSet};

use seat_algo::{resolve_districts, RawShare};
use seat_core::{AllocationMethod, CoreError, Corporation, DistrictNo, LevelingRounding, PartyId, ShareScale};
use thiserror::Error;
use tracing::{info, warn};

pub mod allocate;
pub mod build_report;
pub mod candidates;
pub mod inputs;
pub mod normalize;
pub mod validate;

pub use build_report::{CandidateRow, DirectRow, LevelingRow, PartyRow, SeatReport};
pub use validate::{EntityRef, Severity, ValidationIssue, ValidationReport};

/// Single error surface for the pipeline orchestration.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input: {0}")]
    Input(String),
    #[error("validation failed ({} error(s))", .0.error_count())]
    Validate(ValidationReport),
    #[error(transparent)]
    Method(#[from] CoreError),
    #[error("allocate: {0}")]
    Allocate(String),
    #[error(transparent)]
    Io(#[from] seat_io::IoError),
}

/// Where the party-level shares came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShareSource {
    /// Set directly by the caller.
    #[default]
    Manual,
    Scenario,
    Feed,
    Poll,
    /// `100 / n` for every registered party.
    Even,
}

/// Everything one run needs. Shares stay raw until the normalize stage.
#[derive(Clone, Debug)]
pub struct PipelineInput {
    pub corporation: Corporation,
    pub method: AllocationMethod,
    pub rounding: LevelingRounding,
    pub scale: ShareScale,
    pub source: ShareSource,
    pub shares: BTreeMap<PartyId, RawShare>,
    pub district_shares: BTreeMap<DistrictNo, BTreeMap<PartyId, RawShare>>,
    /// Districts won by an independent candidate.
    pub independent: BTreeSet<DistrictNo>,
    /// District keys from the input that are not district numbers.
    pub rejected_district_keys: Vec<String>,
}

/// Run the validation stages only.
pub fn validate_only(input: &PipelineInput) -> ValidationReport {
    let norm = normalize::normalize(input);
    validate::validate(input, &norm)
}

/// Full pipeline.
pub fn run(input: &PipelineInput) -> Result<SeatReport, PipelineError> {
    let norm = normalize::normalize(input);
    info!(
        parties = norm.shares.len(),
        districts = norm.district_shares.len(),
        dropped = norm.dropped,
        "normalize done"
    );

    let report = validate::validate(input, &norm);
    for issue in report.issues.iter().filter(|i| i.severity == Severity::Warning) {
        warn!(code = issue.code, "{}", issue.message);
    }
    if !report.pass {
        return Err(PipelineError::Validate(report));
    }
    info!(warnings = report.issues.len(), "validate passed");

    let districts = resolve_districts(&norm.district_shares, &input.independent, &norm.universe);
    info!(
        decided = districts.winners.len(),
        independent = districts.independent_seats,
        tied = districts.tied.len(),
        "districts resolved"
    );

    let allocation = allocate::allocate(input, &norm, &districts)?;
    info!(method = %input.method, distributed = allocation.distributed_seats, "allocation done");

    let sets = candidates::select_all(&input.corporation, &norm.universe, &allocation.seats, &districts);

    let fingerprint = build_report::input_fingerprint(input, &norm)?;
    let doc = build_report::build(build_report::BuildCtx {
        input,
        norm: &norm,
        districts: &districts,
        allocation: &allocation,
        candidates: sets,
        warnings: report.issues,
        input_sha256: fingerprint,
    });
    info!(allocated = doc.allocated_total, compensatory = doc.compensatory_seats, "report built");
    Ok(doc)
}
