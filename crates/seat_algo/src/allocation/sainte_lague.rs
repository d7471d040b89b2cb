//! Sainte-Laguë (highest averages with odd divisors) allocation.
//!
//! Contract:
//! - Every party in the share map starts at zero seats.
//! - `seats` rounds; each round awards one seat to the strictly largest
//!   quotient v / (2*s + 1). No positive quotient → nothing is awarded.
//! - No division in comparisons (cross-multiply).
//!
//! Determinism:
//! - Scans iterate in `PartyUniverse` order; a tie keeps the earliest party.
//! - The outcome reports whether the last awarded seat was tie-broken.

use core::cmp::Ordering;

use seat_core::{PartyId, PartyUniverse, SeatMap, VoteShareMap};
use tracing::debug;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SainteLagueOutcome {
    /// Seats per party, total over the universe.
    pub seats: SeatMap,
    /// True iff the final awarded seat involved a tie.
    pub last_seat_tie: bool,
}

/// Allocate `seats` by Sainte-Laguë over `shares`.
pub fn allocate_sainte_lague(
    shares: &VoteShareMap,
    seats: u32,
    universe: &PartyUniverse,
) -> SainteLagueOutcome {
    let mut order: Vec<(&PartyId, f64)> = shares
        .iter()
        .filter(|(_, v)| v.is_finite() && **v > 0.0)
        .map(|(id, &v)| (id, v))
        .collect();
    order.sort_by(|a, b| universe.cmp_parties(a.0, b.0));

    let mut counts: Vec<u32> = vec![0; order.len()];
    let mut last_seat_tie = false;

    for round in 0..seats {
        let Some((winner, tie)) = next_award(&order, &counts) else {
            break;
        };
        counts[winner] += 1;
        last_seat_tie = tie;
        debug!(round, party = %order[winner].0, tie, "sainte-lague award");
    }

    let mut out = universe.zeroed::<u32>();
    for ((id, _), n) in order.iter().zip(counts) {
        out.insert((*id).clone(), n);
    }

    debug_assert!(
        order.is_empty() || out.values().sum::<u32>() == seats,
        "sainte-lague must conserve seats"
    );

    SainteLagueOutcome { seats: out, last_seat_tie }
}

/// Index of the largest quotient and whether another party tied with it.
fn next_award(order: &[(&PartyId, f64)], counts: &[u32]) -> Option<(usize, bool)> {
    let mut best: Option<usize> = None;
    let mut tie = false;
    for (i, &(_, v)) in order.iter().enumerate() {
        match best {
            None => best = Some(i),
            Some(b) => match cmp_quotients(v, counts[i], order[b].1, counts[b]) {
                Ordering::Greater => {
                    best = Some(i);
                    tie = false;
                }
                Ordering::Equal => tie = true,
                Ordering::Less => {}
            },
        }
    }
    best.map(|b| (b, tie))
}

/// Compare v_a / (2*s_a+1) against v_b / (2*s_b+1) by cross-multiplication.
fn cmp_quotients(v_a: f64, s_a: u32, v_b: f64, s_b: u32) -> Ordering {
    let da = 2.0 * f64::from(s_a) + 1.0;
    let db = 2.0 * f64::from(s_b) + 1.0;
    (v_a * db).partial_cmp(&(v_b * da)).unwrap_or(Ordering::Equal)
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

    #[test]
    fn canonical_example_with_tie_on_last_seat() {
        let (s, u) = setup(&[("A", 45.0), ("B", 35.0), ("C", 20.0)]);
        let out = allocate_sainte_lague(&s, 10, &u);
        assert_eq!(out.seats[&pid("A")], 5);
        assert_eq!(out.seats[&pid("B")], 3);
        assert_eq!(out.seats[&pid("C")], 2);
        assert!(out.last_seat_tie);
    }

    #[test]
    fn tie_follows_universe_not_id_order() {
        let shares: VoteShareMap = [(pid("A"), 45.0), (pid("B"), 35.0), (pid("C"), 20.0)]
            .into_iter()
            .collect();
        let u = PartyUniverse::from_registry([pid("B"), pid("A"), pid("C")]);
        let out = allocate_sainte_lague(&shares, 10, &u);
        assert_eq!(out.seats[&pid("A")], 4);
        assert_eq!(out.seats[&pid("B")], 4);
        assert_eq!(out.seats[&pid("C")], 2);
    }

    #[test]
    fn zero_seats_and_empty_shares() {
        let (s, u) = setup(&[("A", 10.0)]);
        let out = allocate_sainte_lague(&s, 0, &u);
        assert_eq!(out.seats[&pid("A")], 0);

        let out = allocate_sainte_lague(&VoteShareMap::new(), 5, &u);
        assert_eq!(out.seats.values().sum::<u32>(), 0);
        assert!(!out.last_seat_tie);
    }

    #[test]
    fn output_is_total_over_universe() {
        let shares: VoteShareMap = [(pid("A"), 60.0)].into_iter().collect();
        let u = PartyUniverse::from_registry([pid("A"), pid("B")]);
        let out = allocate_sainte_lague(&shares, 3, &u);
        assert_eq!(out.seats.len(), 2);
        assert_eq!(out.seats[&pid("A")], 3);
        assert_eq!(out.seats[&pid("B")], 0);
    }
}
