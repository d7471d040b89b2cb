//! crates/seat_pipeline/src/validate.rs
//! Structural & semantic validation before any computation.
//! Deterministic outputs: issues are sorted by (severity, code, where, message).

use std::collections::BTreeSet;

use seat_core::{DistrictNo, PartyId, ShareScale};

use crate::normalize::Normalized;
use crate::PipelineInput;

/// Tolerance on the percentage sum.
pub const PERCENT_EPSILON: f64 = 1e-9;

/// Issue severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Where the issue occurred.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "id")]
pub enum EntityRef {
    Root,
    Council,
    Party(PartyId),
    District(DistrictNo),
    Input(String),
}

/// One validation finding.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    #[serde(rename = "where")]
    pub where_: EntityRef,
}

/// pass = no Error; ordering of issues is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Error).count()
    }
}

pub fn validate(input: &PipelineInput, norm: &Normalized) -> ValidationReport {
    let mut issues = Vec::new();

    issues.extend(check_council(input));
    issues.extend(check_shares(input, norm));
    issues.extend(check_district_refs(input));

    sort_issues_stably(&mut issues);
    ValidationReport {
        pass: !issues.iter().any(|i| i.severity == Severity::Error),
        issues,
    }
}

// ------------------------------------------------------------------------------------------------
// Checks
// ------------------------------------------------------------------------------------------------

/// Errors:
/// - "Council.SeatsZero" when the council has no seats
/// - "Council.IndependentsExceedSeats" when more independents won than there are seats
fn check_council(input: &PipelineInput) -> Vec<ValidationIssue> {
    let mut out = Vec::new();
    let seats = input.corporation.council_seats;
    if seats == 0 {
        out.push(err("Council.SeatsZero", "council has no seats".into(), EntityRef::Council));
    }
    let independents = input.independent.len();
    if independents > seats as usize {
        out.push(err(
            "Council.IndependentsExceedSeats",
            format!("{independents} independent winners for {seats} seats"),
            EntityRef::Council,
        ));
    }
    out
}

/// Errors:
/// - "Shares.SumExceeds100" for percentage input summing above 100
/// Warnings:
/// - "Shares.Empty" when no share survived normalization
/// - "Shares.UnregisteredParty" for shares of parties missing from the registry
fn check_shares(input: &PipelineInput, norm: &Normalized) -> Vec<ValidationIssue> {
    let mut out = Vec::new();

    if input.scale == ShareScale::Percent {
        let total: f64 = norm.shares.values().sum();
        if total > 100.0 + PERCENT_EPSILON {
            out.push(err(
                "Shares.SumExceeds100",
                format!("percentages sum to {total}"),
                EntityRef::Root,
            ));
        }
    }

    if norm.shares.is_empty() {
        out.push(warning(
            "Shares.Empty",
            "no positive vote share; every party gets 0 seats".into(),
            EntityRef::Root,
        ));
    }

    let registered: BTreeSet<&PartyId> = input.corporation.parties.iter().map(|p| &p.id).collect();
    let mentioned: BTreeSet<&PartyId> = norm
        .shares
        .keys()
        .chain(norm.district_shares.values().flat_map(|m| m.keys()))
        .collect();
    for id in mentioned.difference(&registered) {
        out.push(warning(
            "Shares.UnregisteredParty",
            format!("party {id} is not in the corporation registry; it has no candidates"),
            EntityRef::Party((*id).clone()),
        ));
    }
    out
}

/// Errors:
/// - "District.Unknown" for district numbers the corporation does not have
/// - "District.BadKey" for district keys that are not numbers
/// Warnings:
/// - "District.IndependentWithShares" when an independent flag overrides shares
fn check_district_refs(input: &PipelineInput) -> Vec<ValidationIssue> {
    let mut out = Vec::new();
    let known: BTreeSet<DistrictNo> = input.corporation.districts.iter().map(|d| d.number).collect();

    let referenced: BTreeSet<DistrictNo> = input
        .district_shares
        .keys()
        .chain(input.independent.iter())
        .copied()
        .collect();
    for d in referenced.difference(&known) {
        out.push(err(
            "District.Unknown",
            format!("district {d} does not exist in {}", input.corporation.name),
            EntityRef::District(*d),
        ));
    }

    for key in &input.rejected_district_keys {
        out.push(err(
            "District.BadKey",
            format!("district key {key:?} is not a district number"),
            EntityRef::Input(key.clone()),
        ));
    }

    for d in &input.independent {
        if input.district_shares.get(d).is_some_and(|m| !m.is_empty()) {
            out.push(warning(
                "District.IndependentWithShares",
                format!("district {d} is flagged independent; its shares are ignored"),
                EntityRef::District(*d),
            ));
        }
    }
    out
}

fn err(code: &'static str, message: String, where_: EntityRef) -> ValidationIssue {
    ValidationIssue { severity: Severity::Error, code, message, where_ }
}

fn warning(code: &'static str, message: String, where_: EntityRef) -> ValidationIssue {
    ValidationIssue { severity: Severity::Warning, code, message, where_ }
}

/// Errors first, then code, location and message.
pub fn sort_issues_stably(issues: &mut [ValidationIssue]) {
    issues.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then_with(|| a.code.cmp(b.code))
            .then_with(|| a.where_.cmp(&b.where_))
            .then_with(|| a.message.cmp(&b.message))
    });
}
