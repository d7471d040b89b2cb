// crates/seat_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Algorithm layer. Every entry point is a pure function over in-memory data
//! and takes the caller's `PartyUniverse` for tie-breaks and total outputs.

pub use seat_core::{
    DirectMandateMap, DistrictNo, PartyId, PartyUniverse, SeatMap, VoteShareMap,
};

// ----------------------------- Inputs --------------------------------------------------

pub mod normalize;
pub mod districts;
pub mod aggregate;
pub mod projection;

pub use normalize::{normalize_shares, parse_share, RawShare};
pub use districts::{resolve_districts, DistrictOutcome};
pub use aggregate::{aggregate_feed, FeedRow, FeedSummary};
pub use projection::{default_shares, project_district_shares};

// ----------------------------- Allocation (public surface) ---------------------------

pub mod allocation {
    pub mod sainte_lague;
    pub mod largest_remainder;

    pub use sainte_lague::{allocate_sainte_lague, SainteLagueOutcome};
    pub use largest_remainder::{apportion_by_ratio, ideal_claims, RatioApportionment};
}

pub use allocation::{allocate_sainte_lague, SainteLagueOutcome};

// ----------------------------- Mixed member & candidates ------------------------------

pub mod mmp;
pub mod candidates;

pub use mmp::{mixed_member, LevelingReport, MixedMemberOutcome, MixedMemberParams};
pub use candidates::{select_candidates, CandidateSet, DirectCandidate};
