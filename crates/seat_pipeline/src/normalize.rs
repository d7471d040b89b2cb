//! NORMALIZE stage: raw shares → `VoteShareMap`s, plus the party universe of
//! this run (registry order, then unregistered ids ascending).

use std::collections::BTreeMap;

use seat_algo::normalize_shares;
use seat_core::{DistrictNo, PartyUniverse, VoteShareMap};

use crate::PipelineInput;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Normalized {
    pub universe: PartyUniverse,
    pub shares: VoteShareMap,
    pub district_shares: BTreeMap<DistrictNo, VoteShareMap>,
    /// Raw entries that did not survive normalization.
    pub dropped: usize,
}

pub fn normalize(input: &PipelineInput) -> Normalized {
    let shares = normalize_shares(&input.shares);
    let mut dropped = input.shares.len() - shares.len();

    let mut district_shares = BTreeMap::new();
    for (d, raw) in &input.district_shares {
        let votes = normalize_shares(raw);
        dropped += raw.len() - votes.len();
        district_shares.insert(*d, votes);
    }

    let universe = input
        .corporation
        .universe()
        .extended_with(shares.keys().chain(district_shares.values().flat_map(|m| m.keys())));

    Normalized { universe, shares, district_shares, dropped }
}
