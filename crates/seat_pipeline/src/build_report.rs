//! BUILD stage: the `SeatReport` document and the input fingerprint.
//!
//! Lists are in universe order (parties) or ascending district number; maps are
//! `BTreeMap`s, so the canonical JSON of a report is stable across runs.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use seat_algo::{CandidateSet, DirectCandidate, DistrictOutcome};
use seat_core::{
    AllocationMethod, Corporation, DirectMandateMap, DistrictNo, LevelingRounding, ListCandidate,
    PartyId, SeatMap, ShareScale, VoteShareMap,
};
use seat_io::hasher::sha256_canonical;

use crate::allocate::Allocation;
use crate::normalize::Normalized;
use crate::validate::ValidationIssue;
use crate::{PipelineError, PipelineInput, ShareSource};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeatReport {
    pub corporation: String,
    pub method: AllocationMethod,
    pub share_source: ShareSource,
    /// Regular council size.
    pub council_seats: u32,
    pub independent_seats: u32,
    /// Seats distributed among parties (council size minus independents).
    pub distributed_seats: u32,
    /// Σ party seats.
    pub allocated_total: u32,
    /// max(0, allocated + independents − council size).
    pub compensatory_seats: u32,
    pub parties: Vec<PartyRow>,
    pub seats: SeatMap,
    pub direct_mandates: DirectMandateMap,
    pub district_winners: BTreeMap<DistrictNo, Option<PartyId>>,
    pub candidates: Vec<CandidateRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leveling: Option<LevelingRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus_party: Option<PartyId>,
    /// Human-readable notes on ties decided by party order.
    pub notes: Vec<String>,
    pub warnings: Vec<ValidationIssue>,
    pub input_sha256: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PartyRow {
    pub id: PartyId,
    pub short_name: String,
    pub color: String,
    /// Normalized share (0 when absent).
    pub share: f64,
    /// Mixed-member base tier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_seats: Option<u32>,
    pub seats: u32,
    pub direct_mandates: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DirectRow {
    pub district: DistrictNo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub district_name: Option<String>,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CandidateRow {
    pub party: PartyId,
    pub seats: u32,
    pub direct: Vec<DirectRow>,
    pub list: Vec<ListCandidate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unseated_direct: Vec<DirectRow>,
    pub vacant: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LevelingRow {
    pub total_overhang: u32,
    pub max_ratio: f64,
    pub leveled_total: u32,
}

/// Everything the build step reads.
pub struct BuildCtx<'a> {
    pub input: &'a PipelineInput,
    pub norm: &'a Normalized,
    pub districts: &'a DistrictOutcome,
    pub allocation: &'a Allocation,
    pub candidates: Vec<CandidateSet>,
    pub warnings: Vec<ValidationIssue>,
    pub input_sha256: String,
}

pub fn build(ctx: BuildCtx<'_>) -> SeatReport {
    let BuildCtx { input, norm, districts, allocation, candidates, warnings, input_sha256 } = ctx;
    let corp = &input.corporation;

    let seats = norm.universe.total(&allocation.seats);
    let direct_mandates = norm.universe.total(&districts.direct_mandates);
    let base = allocation.mixed.as_ref().map(|m| &m.base);

    let parties = norm
        .universe
        .iter()
        .map(|id| {
            let party = corp.party(id);
            PartyRow {
                id: id.clone(),
                short_name: party.map_or_else(|| id.to_string(), |p| p.short_name.clone()),
                color: party.map(|p| p.color.clone()).unwrap_or_default(),
                share: norm.shares.get(id).copied().unwrap_or(0.0),
                base_seats: base.map(|b| b.get(id).copied().unwrap_or(0)),
                seats: seats.get(id).copied().unwrap_or(0),
                direct_mandates: direct_mandates.get(id).copied().unwrap_or(0),
            }
        })
        .collect();

    let allocated_total: u32 = seats.values().sum();
    let compensatory_seats =
        (allocated_total + districts.independent_seats).saturating_sub(corp.council_seats);

    let mut notes = Vec::new();
    for d in &districts.tied {
        let winner = districts.winners.get(d).cloned().flatten();
        notes.push(match winner {
            Some(p) => format!("district {d}: tie for first place decided by party order ({p})"),
            None => format!("district {d}: tie for first place"),
        });
    }
    if allocation.last_seat_tie {
        notes.push("last seat: tied quotients decided by party order".to_string());
    }

    let (leveling, bonus_party) = match &allocation.mixed {
        Some(m) => (
            m.leveling.as_ref().map(|l| LevelingRow {
                total_overhang: l.total_overhang,
                max_ratio: l.max_ratio,
                leveled_total: l.leveled_total,
            }),
            m.bonus_party.clone(),
        ),
        None => (None, None),
    };

    SeatReport {
        corporation: corp.name.clone(),
        method: input.method,
        share_source: input.source,
        council_seats: corp.council_seats,
        independent_seats: districts.independent_seats,
        distributed_seats: allocation.distributed_seats,
        allocated_total,
        compensatory_seats,
        parties,
        seats,
        direct_mandates,
        district_winners: districts.winners.clone(),
        candidates: candidates.into_iter().map(candidate_row).collect(),
        leveling,
        bonus_party,
        notes,
        warnings,
        input_sha256,
    }
}

fn direct_row(c: DirectCandidate) -> DirectRow {
    DirectRow { district: c.district, district_name: c.district_name, name: c.name }
}

fn candidate_row(set: CandidateSet) -> CandidateRow {
    CandidateRow {
        party: set.party,
        seats: set.seats,
        direct: set.direct.into_iter().map(direct_row).collect(),
        list: set.list,
        unseated_direct: set.unseated_direct.into_iter().map(direct_row).collect(),
        vacant: set.vacant,
    }
}

// ----------------------------- Fingerprint -----------------------------

#[derive(Serialize)]
struct FingerprintDoc<'a> {
    corporation: &'a Corporation,
    method: AllocationMethod,
    rounding: LevelingRounding,
    scale: ShareScale,
    shares: &'a VoteShareMap,
    district_shares: &'a BTreeMap<DistrictNo, VoteShareMap>,
    independent: &'a BTreeSet<DistrictNo>,
}

/// SHA-256 over the canonical JSON of the normalized input.
///
/// Raw values that normalize identically hash identically, so a feed snapshot
/// that changed only in unmapped columns yields the same fingerprint.
pub fn input_fingerprint(input: &PipelineInput, norm: &Normalized) -> Result<String, PipelineError> {
    let doc = FingerprintDoc {
        corporation: &input.corporation,
        method: input.method,
        rounding: input.rounding,
        scale: input.scale,
        shares: &norm.shares,
        district_shares: &norm.district_shares,
        independent: &input.independent,
    };
    Ok(sha256_canonical(&doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use seat_core::PollData;

    fn pid(s: &str) -> PartyId {
        s.parse().unwrap()
    }

    fn corp() -> Corporation {
        Corporation {
            name: "T".into(),
            council_seats: 6,
            parties: Vec::new(),
            districts: Vec::new(),
            poll: PollData::default(),
            feed: None,
        }
    }

    #[test]
    fn fingerprint_ignores_raw_spelling() {
        let a = PipelineInput::new(corp(), AllocationMethod::SainteLague)
            .with_shares([(pid("a"), seat_algo::RawShare::Text(" 60 ".into()))]);
        let b = PipelineInput::new(corp(), AllocationMethod::SainteLague).with_shares([(pid("a"), 60.0)]);
        let fa = input_fingerprint(&a, &crate::normalize::normalize(&a)).unwrap();
        let fb = input_fingerprint(&b, &crate::normalize::normalize(&b)).unwrap();
        assert_eq!(fa, fb);

        let c = PipelineInput::new(corp(), AllocationMethod::MixedMember).with_shares([(pid("a"), 60.0)]);
        let fc = input_fingerprint(&c, &crate::normalize::normalize(&c)).unwrap();
        assert_ne!(fa, fc);
    }
}
