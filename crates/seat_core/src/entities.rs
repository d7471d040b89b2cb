//! Registry entities (parties, districts, corporation) and the map aliases
//! that flow between engine stages. Immutable per computation call.

use std::collections::BTreeMap;

use crate::determinism::PartyUniverse;
use crate::tokens::{DistrictNo, PartyId};

/// Party → strictly positive, finite vote share (percentage or raw tally).
/// Zero or unparsable inputs are absent, never zero-valued entries.
pub type VoteShareMap = BTreeMap<PartyId, f64>;

/// Party → number of districts won outright.
pub type DirectMandateMap = BTreeMap<PartyId, u32>;

/// Party → seat count.
pub type SeatMap = BTreeMap<PartyId, u32>;

/// One ranked entry of a party list (1-based position).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListCandidate {
    pub position: u32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Party {
    pub id: PartyId,
    pub short_name: String,
    /// Display attribute only.
    pub color: String,
    pub list_candidates: Vec<ListCandidate>,
    /// District number → the party's candidate in that district.
    pub district_candidates: BTreeMap<DistrictNo, String>,
}

impl Party {
    pub fn district_candidate(&self, district: DistrictNo) -> Option<&str> {
        self.district_candidates.get(&district).map(String::as_str)
    }

    /// List candidates sorted by ascending position (stable for equal positions).
    pub fn list_in_rank_order(&self) -> Vec<&ListCandidate> {
        let mut v: Vec<&ListCandidate> = self.list_candidates.iter().collect();
        v.sort_by_key(|c| c.position);
        v
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct District {
    pub number: DistrictNo,
    pub name: String,
}

/// Poll and past-result reference data used to seed shares.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PollData {
    pub poll_results: Option<BTreeMap<PartyId, f64>>,
    /// Party → percentage at the previous election.
    pub past_results: Option<BTreeMap<PartyId, f64>>,
    /// District → party → percentage at the previous election.
    pub past_district_results: Option<BTreeMap<DistrictNo, BTreeMap<PartyId, f64>>>,
}

/// Column layout of an external results feed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeedConfig {
    pub enabled: bool,
    /// Upstream location, kept for the consuming layer; never fetched here.
    pub url: Option<String>,
    /// Feed column → party.
    pub party_mapping: BTreeMap<String, PartyId>,
}

/// A local authority whose council is being elected.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Corporation {
    pub name: String,
    /// Regular (nominal) council size.
    pub council_seats: u32,
    pub parties: Vec<Party>,
    pub districts: Vec<District>,
    pub poll: PollData,
    pub feed: Option<FeedConfig>,
}

impl Corporation {
    /// Canonical party order = order of `parties` in the metadata.
    pub fn universe(&self) -> PartyUniverse {
        PartyUniverse::from_registry(self.parties.iter().map(|p| p.id.clone()))
    }

    pub fn party(&self, id: &PartyId) -> Option<&Party> {
        self.parties.iter().find(|p| &p.id == id)
    }

    pub fn district(&self, number: DistrictNo) -> Option<&District> {
        self.districts.iter().find(|d| d.number == number)
    }

    pub fn district_numbers(&self) -> Vec<DistrictNo> {
        let mut v: Vec<DistrictNo> = self.districts.iter().map(|d| d.number).collect();
        v.sort();
        v
    }
}
