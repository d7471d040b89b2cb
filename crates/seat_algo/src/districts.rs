//! Per-district plurality winners and the induced direct-mandate counts.
//!
//! Determinism:
//! - Candidates are scanned in `PartyUniverse` order; a tie for the maximum
//!   keeps the earliest party and flags the district as tied.
//! - The independent flag takes precedence over any shares.

use std::collections::{BTreeMap, BTreeSet};

use seat_core::{DirectMandateMap, DistrictNo, PartyId, PartyUniverse, VoteShareMap};
use tracing::debug;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DistrictOutcome {
    /// Every known district → winning party (`None` for independents and empty districts).
    pub winners: BTreeMap<DistrictNo, Option<PartyId>>,
    /// Districts won per party, total over the universe.
    pub direct_mandates: DirectMandateMap,
    /// Districts flagged as won by an independent candidate.
    pub independent_seats: u32,
    /// Districts whose winner was decided by the stable party order.
    pub tied: Vec<DistrictNo>,
}

impl DistrictOutcome {
    /// Districts won by `party`, ascending.
    pub fn won_by(&self, party: &PartyId) -> Vec<DistrictNo> {
        self.winners
            .iter()
            .filter(|(_, w)| w.as_ref() == Some(party))
            .map(|(d, _)| *d)
            .collect()
    }
}

/// Resolve winners for all districts in `shares` and `independent`.
pub fn resolve_districts(
    shares: &BTreeMap<DistrictNo, VoteShareMap>,
    independent: &BTreeSet<DistrictNo>,
    universe: &PartyUniverse,
) -> DistrictOutcome {
    let mut out = DistrictOutcome {
        direct_mandates: universe.zeroed(),
        ..DistrictOutcome::default()
    };

    let all: BTreeSet<DistrictNo> = shares.keys().chain(independent.iter()).copied().collect();

    for d in all {
        if independent.contains(&d) {
            out.independent_seats += 1;
            out.winners.insert(d, None);
            continue;
        }
        let winner = match shares.get(&d) {
            Some(votes) => {
                let (w, tied) = plurality_winner(votes, universe);
                if tied {
                    debug!(district = %d, winner = ?w, "tie for first place; party order decides");
                    out.tied.push(d);
                }
                w
            }
            None => None,
        };
        if let Some(p) = &winner {
            *out.direct_mandates.entry(p.clone()).or_insert(0) += 1;
        }
        out.winners.insert(d, winner);
    }

    out
}

/// Strictly greatest positive share; returns (winner, tie_broken).
fn plurality_winner(votes: &VoteShareMap, universe: &PartyUniverse) -> (Option<PartyId>, bool) {
    let mut ids: Vec<&PartyId> = votes.keys().collect();
    ids.sort_by(|a, b| universe.cmp_parties(a, b));

    let mut best: Option<(&PartyId, f64)> = None;
    let mut tied = false;
    for id in ids {
        let v = votes[id];
        if v <= 0.0 || !v.is_finite() {
            continue;
        }
        match best {
            None => best = Some((id, v)),
            Some((_, bv)) if v > bv => {
                best = Some((id, v));
                tied = false;
            }
            Some((_, bv)) if v == bv => tied = true,
            Some(_) => {}
        }
    }
    (best.map(|(id, _)| id.clone()), tied)
}
