//! ALLOCATE stage: dispatch on the allocation method and re-check the
//! method's guarantees on the result.
//!
//! Both methods distribute the council size minus the seats already taken by
//! independent district winners.

use seat_algo::{allocate_sainte_lague, mixed_member, DistrictOutcome, MixedMemberOutcome, MixedMemberParams};
use seat_core::{AllocationMethod, SeatMap};
use tracing::debug;

use crate::normalize::Normalized;
use crate::{PipelineError, PipelineInput};

#[derive(Clone, Debug, PartialEq)]
pub struct Allocation {
    /// Final seats, total over the run's universe.
    pub seats: SeatMap,
    /// Seats distributed among parties.
    pub distributed_seats: u32,
    /// Divisor method: the final seat was decided by party order.
    pub last_seat_tie: bool,
    /// Mixed-member details (base tier, leveling, bonus).
    pub mixed: Option<MixedMemberOutcome>,
}

impl Allocation {
    pub fn total(&self) -> u32 {
        self.seats.values().sum()
    }
}

pub fn allocate(
    input: &PipelineInput,
    norm: &Normalized,
    districts: &DistrictOutcome,
) -> Result<Allocation, PipelineError> {
    let distributed = input
        .corporation
        .council_seats
        .saturating_sub(districts.independent_seats);

    let allocation = match input.method {
        AllocationMethod::SainteLague => {
            let out = allocate_sainte_lague(&norm.shares, distributed, &norm.universe);
            Allocation {
                seats: out.seats,
                distributed_seats: distributed,
                last_seat_tie: out.last_seat_tie,
                mixed: None,
            }
        }
        AllocationMethod::MixedMember => {
            let params = MixedMemberParams {
                seats: input.corporation.council_seats,
                direct_mandates: districts.direct_mandates.clone(),
                independent_seats: districts.independent_seats,
                rounding: input.rounding,
            };
            let out = mixed_member(&norm.shares, &params, &norm.universe);
            Allocation {
                seats: out.seats.clone(),
                distributed_seats: out.distributed_seats,
                last_seat_tie: false,
                mixed: Some(out),
            }
        }
    };

    check(input.method, &allocation, norm, districts)?;
    debug!(total = allocation.total(), "allocation checked");
    Ok(allocation)
}

fn check(
    method: AllocationMethod,
    allocation: &Allocation,
    norm: &Normalized,
    districts: &DistrictOutcome,
) -> Result<(), PipelineError> {
    match method {
        AllocationMethod::SainteLague => {
            let total = allocation.total();
            if !norm.shares.is_empty() && total != allocation.distributed_seats {
                return Err(PipelineError::Allocate(format!(
                    "divisor method awarded {total} of {} seats",
                    allocation.distributed_seats
                )));
            }
        }
        AllocationMethod::MixedMember => {
            for (party, dm) in &districts.direct_mandates {
                let held = allocation.seats.get(party).copied().unwrap_or(0);
                if held < *dm {
                    return Err(PipelineError::Allocate(format!(
                        "party {party} holds {held} seats but won {dm} districts"
                    )));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use seat_algo::resolve_districts;
    use seat_core::{Corporation, DistrictNo, PartyId, PollData};

    fn pid(s: &str) -> PartyId {
        s.parse().unwrap()
    }

    fn corp(seats: u32) -> Corporation {
        Corporation {
            name: "T".into(),
            council_seats: seats,
            parties: Vec::new(),
            districts: Vec::new(),
            poll: PollData::default(),
            feed: None,
        }
    }

    fn run(input: &PipelineInput) -> Allocation {
        let norm = normalize(input);
        let d = resolve_districts(&norm.district_shares, &input.independent, &norm.universe);
        allocate(input, &norm, &d).unwrap()
    }

    #[test]
    fn divisor_deducts_independents() {
        let input = PipelineInput::new(corp(10), AllocationMethod::SainteLague)
            .with_shares([(pid("a"), 50.0), (pid("b"), 50.0)])
            .with_independent(DistrictNo(1))
            .with_independent(DistrictNo(2));
        let a = run(&input);
        assert_eq!(a.distributed_seats, 8);
        assert_eq!(a.seats[&pid("a")], 4);
        assert_eq!(a.seats[&pid("b")], 4);
        assert!(a.mixed.is_none());
    }

    #[test]
    fn mixed_member_keeps_mandates() {
        let mut input = PipelineInput::new(corp(10), AllocationMethod::MixedMember)
            .with_shares([(pid("a"), 40.0), (pid("b"), 35.0), (pid("c"), 25.0)]);
        for d in 1..=6 {
            input = input.with_district(DistrictNo(d), [(pid("a"), 60.0), (pid("b"), 40.0)]);
        }
        let a = run(&input);
        let mixed = a.mixed.as_ref().unwrap();
        assert_eq!(mixed.leveling.as_ref().map(|l| l.leveled_total), Some(16));
        assert_eq!(a.seats[&pid("a")], 6);
        assert_eq!(a.total(), 16);
    }
}
