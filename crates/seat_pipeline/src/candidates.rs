//! CANDIDATES stage: officeholders for every party, in universe order.

use std::collections::BTreeMap;

use seat_algo::{select_candidates, CandidateSet, DistrictOutcome};
use seat_core::{Corporation, Party, PartyId, PartyUniverse, SeatMap};

/// Parties outside the registry get an empty roster, so their seats show up as vacant.
pub fn select_all(
    corp: &Corporation,
    universe: &PartyUniverse,
    seats: &SeatMap,
    districts: &DistrictOutcome,
) -> Vec<CandidateSet> {
    universe
        .iter()
        .map(|id| {
            let held = seats.get(id).copied().unwrap_or(0);
            let won = districts.won_by(id);
            match corp.party(id) {
                Some(party) => select_candidates(party, held, &won, &corp.districts),
                None => select_candidates(&unlisted(id), held, &won, &corp.districts),
            }
        })
        .collect()
}

fn unlisted(id: &PartyId) -> Party {
    Party {
        id: id.clone(),
        short_name: id.to_string(),
        color: String::new(),
        list_candidates: Vec::new(),
        district_candidates: BTreeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seat_core::{District, DistrictNo, ListCandidate, PollData};

    fn pid(s: &str) -> PartyId {
        s.parse().unwrap()
    }

    #[test]
    fn registry_order_and_unlisted_parties() {
        let x = Party {
            id: pid("x"),
            short_name: "X".into(),
            color: String::new(),
            list_candidates: vec![
                ListCandidate { position: 1, name: "Anna".into() },
                ListCandidate { position: 2, name: "Bert".into() },
            ],
            district_candidates: [(DistrictNo(1), "Bert".to_string())].into_iter().collect(),
        };
        let corp = Corporation {
            name: "T".into(),
            council_seats: 4,
            parties: vec![x],
            districts: vec![District { number: DistrictNo(1), name: "Nord".into() }],
            poll: PollData::default(),
            feed: None,
        };
        let universe = corp.universe().extended_with([pid("y")].iter());
        let seats: SeatMap = [(pid("x"), 2), (pid("y"), 2)].into_iter().collect();
        let districts = DistrictOutcome {
            winners: [(DistrictNo(1), Some(pid("x")))].into_iter().collect(),
            direct_mandates: [(pid("x"), 1), (pid("y"), 0)].into_iter().collect(),
            independent_seats: 0,
            tied: Vec::new(),
        };

        let sets = select_all(&corp, &universe, &seats, &districts);
        assert_eq!(sets.len(), 2);
        assert_eq!(sets[0].direct[0].name, "Bert");
        assert_eq!(sets[0].list[0].name, "Anna");
        assert_eq!(sets[1].party, pid("y"));
        assert_eq!(sets[1].vacant, 2);
    }
}
