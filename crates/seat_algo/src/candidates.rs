//! Mapping a party's seat count to named officeholders.
//!
//! Direct winners come first (ascending district number), then list
//! candidates by ascending position, skipping names already seated.

use std::collections::BTreeSet;

use seat_core::{District, DistrictNo, ListCandidate, Party, PartyId};
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectCandidate {
    pub district: DistrictNo,
    pub district_name: Option<String>,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateSet {
    pub party: PartyId,
    pub seats: u32,
    /// Seated district winners.
    pub direct: Vec<DirectCandidate>,
    /// Seated list candidates, in rank order.
    pub list: Vec<ListCandidate>,
    /// District winners beyond the party's seat total (divisor method only).
    pub unseated_direct: Vec<DirectCandidate>,
    /// Seats with nobody left to fill them.
    pub vacant: u32,
}

impl CandidateSet {
    pub fn seated_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.direct
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.list.iter().map(|c| c.name.as_str()))
    }
}

/// Select the officeholders of `party` holding `seats`, having won `won`.
pub fn select_candidates(
    party: &Party,
    seats: u32,
    won: &[DistrictNo],
    districts: &[District],
) -> CandidateSet {
    let mut won: Vec<DistrictNo> = won.to_vec();
    won.sort();
    won.dedup();

    let mut winners: Vec<DirectCandidate> = Vec::with_capacity(won.len());
    for d in won {
        match party.district_candidate(d) {
            Some(name) => winners.push(DirectCandidate {
                district: d,
                district_name: districts.iter().find(|x| x.number == d).map(|x| x.name.clone()),
                name: name.to_string(),
            }),
            None => warn!(party = %party.id, district = %d, "district won without a roster entry; skipped"),
        }
    }

    let cap = seats as usize;
    let unseated_direct = if winners.len() > cap { winners.split_off(cap) } else { Vec::new() };
    let direct = winners;

    let mut taken: BTreeSet<&str> = direct
        .iter()
        .chain(unseated_direct.iter())
        .map(|c| c.name.as_str())
        .collect();

    let quota = cap - direct.len();
    let mut list: Vec<ListCandidate> = Vec::new();
    for c in party.list_in_rank_order() {
        if list.len() >= quota {
            break;
        }
        if taken.insert(c.name.as_str()) {
            list.push(c.clone());
        }
    }

    let vacant = (quota - list.len()) as u32;

    CandidateSet {
        party: party.id.clone(),
        seats,
        direct,
        list,
        unseated_direct,
        vacant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn party(district: &[(u32, &str)], list: &[(u32, &str)]) -> Party {
        Party {
            id: "p".parse().unwrap(),
            short_name: "P".into(),
            color: "#123456".into(),
            list_candidates: list
                .iter()
                .map(|(pos, n)| ListCandidate { position: *pos, name: n.to_string() })
                .collect(),
            district_candidates: district
                .iter()
                .map(|(d, n)| (DistrictNo(*d), n.to_string()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn names(set: &CandidateSet) -> Vec<&str> {
        set.seated_names().collect()
    }

    #[test]
    fn list_skips_direct_winners() {
        let p = party(&[(1, "X"), (2, "Y")], &[(1, "X"), (2, "Z"), (3, "W")]);
        let set = select_candidates(&p, 3, &[DistrictNo(2), DistrictNo(1)], &[]);
        assert_eq!(names(&set), vec!["X", "Y", "Z"]);
        assert_eq!(set.list.len(), 1);
        assert_eq!(set.vacant, 0);
    }

    #[test]
    fn short_list_leaves_vacancies() {
        let p = party(&[], &[(1, "A"), (2, "B")]);
        let set = select_candidates(&p, 4, &[], &[]);
        assert_eq!(names(&set), vec!["A", "B"]);
        assert_eq!(set.vacant, 2);
    }

    #[test]
    fn surplus_winners_are_unseated() {
        let p = party(&[(1, "X"), (2, "Y"), (3, "V")], &[(1, "Z")]);
        let districts = vec![District { number: DistrictNo(1), name: "Nord".into() }];
        let set = select_candidates(&p, 2, &[DistrictNo(1), DistrictNo(2), DistrictNo(3)], &districts);
        assert_eq!(names(&set), vec!["X", "Y"]);
        assert_eq!(set.direct[0].district_name.as_deref(), Some("Nord"));
        assert_eq!(set.unseated_direct.len(), 1);
        assert_eq!(set.unseated_direct[0].name, "V");
        assert!(set.list.is_empty());
    }

    #[test]
    fn missing_roster_entry_is_skipped() {
        let p = party(&[(1, "X")], &[(1, "L1"), (2, "L2")]);
        let set = select_candidates(&p, 2, &[DistrictNo(1), DistrictNo(7)], &[]);
        assert_eq!(set.direct.len(), 1);
        assert_eq!(names(&set), vec!["X", "L1"]);
    }

    #[test]
    fn zero_seats_select_nobody() {
        let p = party(&[], &[(1, "A")]);
        let set = select_candidates(&p, 0, &[], &[]);
        assert!(names(&set).is_empty());
        assert_eq!(set.vacant, 0);
    }
}
