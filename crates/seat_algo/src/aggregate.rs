//! Aggregation of a results-feed snapshot into party percentages and
//! per-district tallies.
//!
//! A snapshot is a list of rows (column → cell text). Fixed columns:
//! valid votes `D`, area number `gebiet-nr`, quick-report count
//! `anz-schnellmeldungen`. Party columns are named by the feed's party mapping.
//! Unparsable counts are 0.

use std::collections::{BTreeMap, BTreeSet};

use seat_core::{DistrictNo, PartyId};
use tracing::warn;

pub type FeedRow = BTreeMap<String, String>;

pub const VALID_VOTES_COLUMN: &str = "D";
pub const AREA_COLUMN: &str = "gebiet-nr";
pub const QUICK_REPORTS_COLUMN: &str = "anz-schnellmeldungen";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeedSummary {
    /// Party → Σ votes ÷ Σ valid votes × 100 (0 when nothing is counted yet).
    pub shares: BTreeMap<PartyId, f64>,
    pub party_votes: BTreeMap<PartyId, u64>,
    pub valid_votes: u64,
    /// Area number → party → raw votes.
    pub district_tallies: BTreeMap<DistrictNo, BTreeMap<PartyId, f64>>,
    /// Any row with at least one quick report.
    pub has_reports: bool,
    pub rows: usize,
}

/// Leading decimal digits of the trimmed cell; anything else counts as 0.
pub fn parse_count(cell: Option<&String>) -> u64 {
    let Some(s) = cell else { return 0 };
    let digits: String = s.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

pub fn aggregate_feed(rows: &[FeedRow], mapping: &BTreeMap<String, PartyId>) -> FeedSummary {
    let mut out = FeedSummary {
        rows: rows.len(),
        ..FeedSummary::default()
    };
    for party in mapping.values() {
        out.party_votes.insert(party.clone(), 0);
    }

    let mut missing: BTreeSet<&str> = BTreeSet::new();

    for row in rows {
        out.valid_votes += parse_count(row.get(VALID_VOTES_COLUMN));
        if parse_count(row.get(QUICK_REPORTS_COLUMN)) > 0 {
            out.has_reports = true;
        }

        let area: Option<DistrictNo> = row.get(AREA_COLUMN).and_then(|s| s.parse().ok());

        for (column, party) in mapping {
            if !row.contains_key(column) {
                missing.insert(column.as_str());
            }
            let votes = parse_count(row.get(column));
            *out.party_votes.entry(party.clone()).or_insert(0) += votes;
            if let Some(d) = area {
                *out
                    .district_tallies
                    .entry(d)
                    .or_default()
                    .entry(party.clone())
                    .or_insert(0.0) += votes as f64;
            }
        }
    }

    for column in missing {
        warn!(column, "mapped feed column absent from snapshot; counted as 0");
    }

    let valid = out.valid_votes as f64;
    out.shares = out
        .party_votes
        .iter()
        .map(|(p, &v)| {
            let pct = if out.valid_votes > 0 { v as f64 / valid * 100.0 } else { 0.0 };
            (p.clone(), pct)
        })
        .collect();

    out
}
