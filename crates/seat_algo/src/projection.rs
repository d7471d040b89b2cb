//! Seeding shares from poll and past-election data.

use std::collections::BTreeMap;

use seat_core::{Corporation, DistrictNo, PartyId, PartyUniverse};

/// Party id whose past district value is carried over unchanged.
pub const OTHERS: &str = "others";

/// Every party gets `100 / n` percent. Empty universe → empty map.
pub fn default_shares(universe: &PartyUniverse) -> BTreeMap<PartyId, f64> {
    if universe.is_empty() {
        return BTreeMap::new();
    }
    let each = 100.0 / universe.len() as f64;
    universe.iter().map(|p| (p.clone(), each)).collect()
}

/// poll / past per party; 1 when either value is missing or past is 0.
pub fn change_factors(corp: &Corporation) -> BTreeMap<PartyId, f64> {
    let poll = corp.poll.poll_results.as_ref();
    let past = corp.poll.past_results.as_ref();
    corp.parties
        .iter()
        .map(|p| {
            let now = poll.and_then(|m| m.get(&p.id)).copied().unwrap_or(0.0);
            let then = past.and_then(|m| m.get(&p.id)).copied().unwrap_or(0.0);
            let f = if now > 0.0 && then > 0.0 { now / then } else { 1.0 };
            (p.id.clone(), f)
        })
        .collect()
}

/// District → party → projected percentage, total over districts and parties.
///
/// Without poll, past and past-district data every value is 0.
pub fn project_district_shares(corp: &Corporation) -> BTreeMap<DistrictNo, BTreeMap<PartyId, f64>> {
    let (Some(poll), Some(_), Some(past_districts)) = (
        corp.poll.poll_results.as_ref(),
        corp.poll.past_results.as_ref(),
        corp.poll.past_district_results.as_ref(),
    ) else {
        return corp
            .districts
            .iter()
            .map(|d| (d.number, corp.parties.iter().map(|p| (p.id.clone(), 0.0)).collect()))
            .collect();
    };

    let factors = change_factors(corp);
    let poll_of = |id: &PartyId| poll.get(id).copied().unwrap_or(0.0);

    let mut out = BTreeMap::new();
    for d in &corp.districts {
        let mut row: BTreeMap<PartyId, f64> = BTreeMap::new();
        match past_districts.get(&d.number) {
            Some(past) => {
                for p in &corp.parties {
                    let value = match past.get(&p.id).copied() {
                        v if p.id.as_str() == OTHERS => v.unwrap_or(0.0),
                        Some(v) if v > 0.0 => v * factors.get(&p.id).copied().unwrap_or(1.0),
                        _ => poll_of(&p.id),
                    };
                    row.insert(p.id.clone(), value);
                }
            }
            None => {
                for p in &corp.parties {
                    row.insert(p.id.clone(), poll_of(&p.id));
                }
            }
        }

        let total: f64 = row.values().sum();
        if total > 0.0 && total != 100.0 {
            let k = 100.0 / total;
            for v in row.values_mut() {
                *v *= k;
            }
        }
        out.insert(d.number, row);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use seat_core::{District, Party, PollData};

    fn pid(s: &str) -> PartyId {
        s.parse().unwrap()
    }

    fn party(id: &str) -> Party {
        Party {
            id: pid(id),
            short_name: id.to_uppercase(),
            color: String::new(),
            list_candidates: Vec::new(),
            district_candidates: BTreeMap::new(),
        }
    }

    fn corp(poll: PollData) -> Corporation {
        Corporation {
            name: "Test".into(),
            council_seats: 10,
            parties: vec![party("a"), party("b"), party("others")],
            districts: vec![
                District { number: DistrictNo(1), name: "Eins".into() },
                District { number: DistrictNo(2), name: "Zwei".into() },
            ],
            poll,
            feed: None,
        }
    }

    fn map(pairs: &[(&str, f64)]) -> BTreeMap<PartyId, f64> {
        pairs.iter().map(|(k, v)| (pid(k), *v)).collect()
    }

    #[test]
    fn default_shares_split_evenly() {
        let u = PartyUniverse::from_registry([pid("a"), pid("b"), pid("c"), pid("d")]);
        let s = default_shares(&u);
        assert_eq!(s.len(), 4);
        assert!(s.values().all(|&v| v == 25.0));
        assert!(default_shares(&PartyUniverse::default()).is_empty());
    }

    #[test]
    fn projection_scales_past_by_change_factor() {
        let mut past_d = BTreeMap::new();
        past_d.insert(DistrictNo(1), map(&[("a", 40.0), ("b", 40.0), ("others", 20.0)]));
        let c = corp(PollData {
            poll_results: Some(map(&[("a", 60.0), ("b", 30.0)])),
            past_results: Some(map(&[("a", 40.0), ("b", 40.0)])),
            past_district_results: Some(past_d),
        });

        let out = project_district_shares(&c);
        // d1 before rescale: a 60, b 30, others 20 → total 110
        let d1 = &out[&DistrictNo(1)];
        assert!((d1[&pid("a")] - 60.0 * 100.0 / 110.0).abs() < 1e-9);
        assert!((d1[&pid("others")] - 20.0 * 100.0 / 110.0).abs() < 1e-9);
        // d2 has no past data → poll values (sum 90, rescaled)
        let d2 = &out[&DistrictNo(2)];
        assert!((d2[&pid("a")] - 60.0 * 100.0 / 90.0).abs() < 1e-9);
        assert_eq!(d2[&pid("others")], 0.0);
    }

    #[test]
    fn projection_without_data_is_all_zero() {
        let out = project_district_shares(&corp(PollData::default()));
        assert_eq!(out.len(), 2);
        assert!(out.values().flat_map(|m| m.values()).all(|&v| v == 0.0));
    }
}
