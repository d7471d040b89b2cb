// crates/seat_algo/src/mmp.rs
//
// Two-tier mixed-member apportionment ("rock"):
// - base tier: ideal claims, floors, ratio-ranked leftovers (allocation::largest_remainder),
// - overhang check against district mandates, restricted to parties holding ≥1 base seat,
// - leveling: enlarge the council to an even total and reapportion over those parties,
// - otherwise a majority bonus for a party with > 50% of the votes but ≤ half the seats.
// Every path ends by lifting each party to at least its direct mandates.
//
// Determinism & policy:
// - No RNG anywhere. Ties follow the ratio ranking (ratio ↓, share ↓, universe order).
// - Independents' seats are deducted before anything is distributed among parties.

use std::collections::BTreeMap;

use seat_core::{DirectMandateMap, LevelingRounding, PartyId, PartyUniverse, SeatMap, VoteShareMap};
use tracing::debug;

use crate::allocation::largest_remainder::apportion_by_ratio;

/// Inputs besides the shares. `Default` = no mandates, no independents, ceil rounding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MixedMemberParams {
    /// Regular council size.
    pub seats: u32,
    pub direct_mandates: DirectMandateMap,
    /// Seats already taken by successful independent candidates.
    pub independent_seats: u32,
    pub rounding: LevelingRounding,
}

/// Details of a leveling round.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelingReport {
    /// Σ (direct mandates − base seats) over overhang parties.
    pub total_overhang: u32,
    /// max (direct mandates / ideal claim) over overhang parties.
    pub max_ratio: f64,
    /// Enlarged (even) number of seats that was reapportioned.
    pub leveled_total: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MixedMemberOutcome {
    /// Final seats, total over the universe.
    pub seats: SeatMap,
    /// Base-tier seats before leveling/bonus, total over the universe.
    pub base: SeatMap,
    /// Base-tier ideal claims of participating parties.
    pub ideal: BTreeMap<PartyId, f64>,
    /// Base-tier ranking, best first.
    pub ranking: Vec<PartyId>,
    /// Seats distributed among parties (council size minus independents).
    pub distributed_seats: u32,
    pub leveling: Option<LevelingReport>,
    pub bonus_party: Option<PartyId>,
    /// Σ final seats; exceeds `distributed_seats` under leveling or clamping.
    pub effective_total: u32,
}

/// Run the mixed-member method.
pub fn mixed_member(
    shares: &VoteShareMap,
    params: &MixedMemberParams,
    universe: &PartyUniverse,
) -> MixedMemberOutcome {
    let distributed = params.seats.saturating_sub(params.independent_seats);

    let votes: VoteShareMap = shares
        .iter()
        .filter(|(_, v)| v.is_finite() && **v > 0.0)
        .map(|(id, &v)| (id.clone(), v))
        .collect();

    let base = apportion_by_ratio(&votes, distributed, universe);
    debug!(distributed, ranking = ?base.ranking, "mixed-member base tier");

    let dm = |p: &PartyId| params.direct_mandates.get(p).copied().unwrap_or(0);

    // Parties with ≥1 base seat, in universe order.
    let mut holders: Vec<&PartyId> = base.seats.iter().filter(|(_, s)| **s > 0).map(|(id, _)| id).collect();
    holders.sort_by(|a, b| universe.cmp_parties(a, b));

    let mut has_overhang = false;
    let mut total_overhang = 0u32;
    let mut max_ratio = 0.0f64;
    for p in &holders {
        let (d, s) = (dm(*p), base.seats[*p]);
        if d > s {
            has_overhang = true;
            total_overhang += d - s;
            let claim = base.ideal.get(*p).copied().unwrap_or(0.0);
            if claim > 0.0 {
                max_ratio = max_ratio.max(f64::from(d) / claim);
            }
        }
    }

    let mut leveling = None;
    let mut bonus_party = None;

    let mut seats = if has_overhang {
        let leveled_total = leveled_total(max_ratio, distributed, total_overhang, params.rounding);
        debug!(total_overhang, max_ratio, leveled_total, "overhang: leveling");

        let restricted: VoteShareMap = holders
            .iter()
            .map(|p| ((*p).clone(), votes[*p]))
            .collect();
        let lev = apportion_by_ratio(&restricted, leveled_total, universe);

        leveling = Some(LevelingReport { total_overhang, max_ratio, leveled_total });
        universe.total(&lev.seats)
    } else {
        let mut seats = universe.total(&base.seats);
        bonus_party = apply_majority_bonus(&mut seats, &votes, distributed, &base.ranking, universe);
        seats
    };

    // Every path: seats ≥ direct mandates.
    for (p, &d) in &params.direct_mandates {
        let s = seats.entry(p.clone()).or_insert(0);
        if *s < d {
            *s = d;
        }
    }

    debug_assert!(
        params.direct_mandates.iter().all(|(p, d)| seats.get(p).copied().unwrap_or(0) >= *d),
        "mixed-member seats must cover direct mandates"
    );

    let effective_total = seats.values().sum();

    MixedMemberOutcome {
        seats,
        base: universe.total(&base.seats),
        ideal: base.ideal,
        ranking: base.ranking,
        distributed_seats: distributed,
        leveling,
        bonus_party,
        effective_total,
    }
}

/// T = max(round(max_ratio × N), N + overhang), bumped to the next even number.
pub fn leveled_total(max_ratio: f64, seats: u32, total_overhang: u32, rounding: LevelingRounding) -> u32 {
    let raw = max_ratio * f64::from(seats);
    let rounded = match rounding {
        LevelingRounding::Ceil => raw.ceil(),
        LevelingRounding::Floor => raw.floor(),
    };
    let by_ratio = if rounded >= f64::from(u32::MAX) {
        u32::MAX
    } else if rounded > 0.0 {
        rounded as u32
    } else {
        0
    };
    let mut t = by_ratio.max(seats.saturating_add(total_overhang));
    if t % 2 == 1 {
        t = t.saturating_add(1);
    }
    t
}

/// Grant one seat to a party with > 50% of the votes holding ≤ half the seats,
/// taking it from the lowest-ranked other party that still holds a seat.
fn apply_majority_bonus(
    seats: &mut SeatMap,
    votes: &VoteShareMap,
    distributed: u32,
    ranking: &[PartyId],
    universe: &PartyUniverse,
) -> Option<PartyId> {
    let total: f64 = votes.values().sum();
    if total <= 0.0 || distributed == 0 {
        return None;
    }

    let mut ids: Vec<&PartyId> = votes.keys().collect();
    ids.sort_by(|a, b| universe.cmp_parties(a, b));

    let winner = ids.into_iter().find(|p| {
        let held = seats.get(*p).copied().unwrap_or(0);
        votes[*p] * 2.0 > total && u64::from(held) * 2 <= u64::from(distributed)
    })?;

    // A transfer, never a new seat: no donor, no bonus.
    let donor = ranking
        .iter()
        .rev()
        .find(|q| *q != winner && seats.get(*q).copied().unwrap_or(0) > 0)?;

    if let Some(s) = seats.get_mut(donor) {
        *s -= 1;
    }
    *seats.entry(winner.clone()).or_insert(0) += 1;
    debug!(bonus = %winner, donor = %donor, "majority bonus");
    Some(winner.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> PartyId {
        s.parse().unwrap()
    }

    fn setup(pairs: &[(&str, f64)]) -> (VoteShareMap, PartyUniverse) {
        let shares = pairs.iter().map(|(k, v)| (pid(k), *v)).collect();
        let u = PartyUniverse::from_registry(pairs.iter().map(|(k, _)| pid(k)));
        (shares, u)
    }

    fn params(seats: u32, dm: &[(&str, u32)]) -> MixedMemberParams {
        MixedMemberParams {
            seats,
            direct_mandates: dm.iter().map(|(k, v)| (pid(k), *v)).collect(),
            ..MixedMemberParams::default()
        }
    }

    #[test]
    fn no_overhang_matches_base() {
        let (s, u) = setup(&[("A", 45.0), ("B", 35.0), ("C", 20.0)]);
        let out = mixed_member(&s, &params(10, &[]), &u);
        // claims 4.5 / 3.5 / 2.0 → A takes the single leftover
        assert_eq!(out.seats[&pid("A")], 5);
        assert_eq!(out.seats[&pid("B")], 3);
        assert_eq!(out.seats[&pid("C")], 2);
        assert_eq!(out.base, out.seats);
        assert!(out.leveling.is_none());
        assert!(out.bonus_party.is_none());
    }

    #[test]
    fn overhang_triggers_even_leveling() {
        let (s, u) = setup(&[("A", 40.0), ("B", 35.0), ("C", 25.0)]);
        let out = mixed_member(&s, &params(10, &[("A", 6)]), &u);

        let lev = out.leveling.clone().expect("leveling");
        assert_eq!(lev.total_overhang, 2);
        assert!((lev.max_ratio - 1.5).abs() < 1e-12);
        assert_eq!(lev.leveled_total, 16);

        assert_eq!(out.base[&pid("A")], 4);
        assert_eq!(out.seats[&pid("A")], 6);
        assert_eq!(out.seats[&pid("B")], 6);
        assert_eq!(out.seats[&pid("C")], 4);
        assert_eq!(out.effective_total, 16);
    }

    #[test]
    fn floor_rounding_still_covers_overhang() {
        assert_eq!(leveled_total(1.5, 10, 2, LevelingRounding::Floor), 16);
        assert_eq!(leveled_total(1.21, 10, 2, LevelingRounding::Ceil), 14);
        assert_eq!(leveled_total(1.21, 10, 2, LevelingRounding::Floor), 12);
        assert_eq!(leveled_total(1.0, 10, 3, LevelingRounding::Ceil), 14);
    }

    #[test]
    fn majority_bonus_applies_when_seats_at_half() {
        let (s, u) = setup(&[("A", 51.0), ("B", 49.0)]);
        let out = mixed_member(&s, &params(10, &[]), &u);
        // base: 5.1 / 4.9 → B takes the leftover (ratio .98 > .85)
        assert_eq!(out.base[&pid("A")], 5);
        assert_eq!(out.base[&pid("B")], 5);
        assert_eq!(out.bonus_party, Some(pid("A")));
        assert_eq!(out.seats[&pid("A")], 6);
        assert_eq!(out.seats[&pid("B")], 4);
    }

    #[test]
    fn majority_party_above_half_gets_no_bonus() {
        let (s, u) = setup(&[("A", 55.0), ("B", 30.0), ("C", 15.0)]);
        let out = mixed_member(&s, &params(10, &[]), &u);
        assert_eq!(out.seats[&pid("A")], 6);
        assert_eq!(out.seats[&pid("B")], 3);
        assert_eq!(out.seats[&pid("C")], 1);
        assert_eq!(out.effective_total, 10);
    }

    #[test]
    fn mandates_of_seatless_party_are_clamped_in() {
        let (s, u) = setup(&[("A", 60.0), ("B", 39.0), ("C", 1.0)]);
        let out = mixed_member(&s, &params(10, &[("C", 1)]), &u);
        assert_eq!(out.base[&pid("C")], 0);
        assert!(out.leveling.is_none());
        assert_eq!(out.seats[&pid("C")], 1);
        assert_eq!(out.effective_total, 11);
    }

    #[test]
    fn independents_reduce_distributed_seats() {
        let (s, u) = setup(&[("A", 50.0), ("B", 50.0)]);
        let p = MixedMemberParams { independent_seats: 2, ..params(10, &[]) };
        let out = mixed_member(&s, &p, &u);
        assert_eq!(out.distributed_seats, 8);
        assert_eq!(out.seats[&pid("A")], 4);
        assert_eq!(out.seats[&pid("B")], 4);
    }

    #[test]
    fn no_bonus_when_independents_fill_the_council() {
        let (s, u) = setup(&[("a", 60.0), ("b", 40.0)]);
        let p = MixedMemberParams { independent_seats: 2, ..params(2, &[]) };
        let out = mixed_member(&s, &p, &u);
        assert_eq!(out.distributed_seats, 0);
        assert!(out.bonus_party.is_none());
        assert_eq!(out.seats[&pid("a")], 0);
        assert_eq!(out.seats[&pid("b")], 0);
        assert_eq!(out.effective_total, 0);
    }

    #[test]
    fn no_bonus_without_a_donor() {
        // nobody holds a seat that could be handed over
        let (s, u) = setup(&[("a", 60.0), ("b", 40.0)]);
        let mut seats: SeatMap = [(pid("a"), 0), (pid("b"), 0)].into_iter().collect();
        let ranking = vec![pid("a"), pid("b")];
        assert!(apply_majority_bonus(&mut seats, &s, 1, &ranking, &u).is_none());
        assert_eq!(seats.values().sum::<u32>(), 0);
    }

    #[test]
    fn seatless_party_stays_at_zero_under_leveling() {
        // claims 6.0 / 3.9 / 0.1: C gets no base seat, A's 8 mandates overhang by 2
        let (s, u) = setup(&[("A", 60.0), ("B", 39.0), ("C", 1.0)]);
        let out = mixed_member(&s, &params(10, &[("A", 8)]), &u);

        assert_eq!(out.base[&pid("C")], 0);
        let lev = out.leveling.clone().expect("leveling");
        assert_eq!(lev.total_overhang, 2);
        // ratio 8 / 6.0 → ceil(13.33) = 14, already even
        assert_eq!(lev.leveled_total, 14);
        // 14 over A and B only: claims 8.48 / 5.52, A ranks first for the leftover
        assert_eq!(out.seats.get(&pid("C")), Some(&0));
        assert_eq!(out.seats[&pid("A")], 9);
        assert_eq!(out.seats[&pid("B")], 5);
        assert_eq!(out.effective_total, 14);
    }

    #[test]
    fn empty_shares_keep_mandates() {
        let u = PartyUniverse::from_registry([pid("A"), pid("B")]);
        let out = mixed_member(&VoteShareMap::new(), &params(10, &[("B", 2)]), &u);
        assert_eq!(out.seats[&pid("A")], 0);
        assert_eq!(out.seats[&pid("B")], 2);
    }
}
