//! Ideal claims and ratio-ranked remainder distribution (the base tier of the
//! mixed-member method).
//!
//! Contract:
//! - Ideal claim c_p = v_p * seats / Σv.
//! - Floors are guaranteed seats.
//! - Leftover seats are handed out one at a time walking the ranking
//!   cyclically. Ranking key: c_p / ceil(c_p) ↓ (an integral claim ranks below
//!   every fractional one), then vote share ↓, then universe order.
//! - If float noise makes the floors overshoot `seats`, seats are trimmed from
//!   the bottom of the same ranking (parties holding ≥1 seat only).
//!
//! Determinism:
//! - No RNG; the ranking is a total order over the parties.

use core::cmp::Ordering;
use std::collections::BTreeMap;

use seat_core::{PartyId, PartyUniverse, SeatMap, VoteShareMap};

/// Rank for integral claims: below every fractional ratio (which lies in (0, 1)).
const INTEGRAL_RANK: f64 = -1.0;

#[derive(Clone, Debug, PartialEq)]
pub struct RatioApportionment {
    /// Ideal (real-valued) claim per participating party.
    pub ideal: BTreeMap<PartyId, f64>,
    /// Seats per participating party (floors + leftovers).
    pub seats: SeatMap,
    /// Participating parties, best-ranked first.
    pub ranking: Vec<PartyId>,
}

/// c_p = v_p * seats / Σv over positive shares. Empty when Σv is not positive.
pub fn ideal_claims(shares: &VoteShareMap, seats: u32) -> BTreeMap<PartyId, f64> {
    let total: f64 = shares.values().filter(|v| v.is_finite() && **v > 0.0).sum();
    if !total.is_finite() || total <= 0.0 {
        return BTreeMap::new();
    }
    let n = f64::from(seats);
    shares
        .iter()
        .filter(|(_, v)| v.is_finite() && **v > 0.0)
        .map(|(id, &v)| (id.clone(), v * n / total))
        .collect()
}

/// Ranking value of a claim: c / ceil(c) for fractional claims, sentinel otherwise.
pub fn ratio_rank(claim: f64) -> f64 {
    let floor = claim.floor();
    if claim - floor > 0.0 {
        claim / claim.ceil()
    } else {
        INTEGRAL_RANK
    }
}

/// Apportion `seats` over `shares` by floors plus ratio-ranked leftovers.
pub fn apportion_by_ratio(
    shares: &VoteShareMap,
    seats: u32,
    universe: &PartyUniverse,
) -> RatioApportionment {
    let ideal = ideal_claims(shares, seats);

    let mut alloc: SeatMap = ideal
        .iter()
        .map(|(id, &c)| (id.clone(), clamp_floor(c)))
        .collect();

    let ranking = build_ranking(&ideal, shares, universe);

    let sum_floors: u64 = alloc.values().map(|&s| u64::from(s)).sum();
    let target = u64::from(seats);
    if sum_floors < target && !ranking.is_empty() {
        distribute_leftovers((target - sum_floors) as u32, &mut alloc, &ranking);
    } else if sum_floors > target {
        trim_over_allocation(seats, &mut alloc, &ranking);
    }

    debug_assert!(
        ranking.is_empty() || alloc.values().map(|&s| u64::from(s)).sum::<u64>() == target,
        "ratio apportionment must hand out exactly `seats`"
    );

    RatioApportionment { ideal, seats: alloc, ranking }
}

fn clamp_floor(c: f64) -> u32 {
    let f = c.floor();
    if f >= f64::from(u32::MAX) {
        u32::MAX
    } else if f > 0.0 {
        f as u32
    } else {
        0
    }
}

/// Ratio ↓, share ↓, universe order ↑.
fn build_ranking(
    ideal: &BTreeMap<PartyId, f64>,
    shares: &VoteShareMap,
    universe: &PartyUniverse,
) -> Vec<PartyId> {
    let mut rows: Vec<(&PartyId, f64, f64)> = ideal
        .iter()
        .map(|(id, &c)| (id, ratio_rank(c), *shares.get(id).unwrap_or(&0.0)))
        .collect();

    rows.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal))
            .then_with(|| universe.cmp_parties(a.0, b.0))
    });

    rows.into_iter().map(|(id, _, _)| id.clone()).collect()
}

/// Walk `ranking` cyclically, one seat per step.
fn distribute_leftovers(target_extra: u32, alloc: &mut SeatMap, ranking: &[PartyId]) {
    let n = ranking.len();
    let mut idx = 0usize;
    for _ in 0..target_extra {
        *alloc.entry(ranking[idx].clone()).or_insert(0) += 1;
        idx += 1;
        if idx == n {
            idx = 0;
        }
    }
}

/// Remove seats from the bottom of `ranking` until the total matches.
fn trim_over_allocation(target: u32, alloc: &mut SeatMap, ranking: &[PartyId]) {
    let mut total: u64 = alloc.values().map(|&s| u64::from(s)).sum();
    let target = u64::from(target);
    while total > target {
        let mut removed = false;
        for id in ranking.iter().rev() {
            if total <= target {
                break;
            }
            if let Some(s) = alloc.get_mut(id) {
                if *s > 0 {
                    *s -= 1;
                    total -= 1;
                    removed = true;
                }
            }
        }
        if !removed {
            break;
        }
    }
}
