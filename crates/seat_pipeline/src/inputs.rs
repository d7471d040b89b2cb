//! Assembling a `PipelineInput` from the available sources.
//!
//! Precedence for party shares: feed (once it carries quick reports), then
//! scenario, then poll results, then an even split. District shares come from
//! the feed tallies, the scenario, or a projection of the poll onto past
//! district results, in that order.

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{debug, info, warn};

use seat_algo::{aggregate_feed, default_shares, project_district_shares, FeedRow, RawShare};
use seat_core::{AllocationMethod, Corporation, DistrictNo, LevelingRounding, PartyId, ShareScale};
use seat_io::loader::ScenarioFile;

use crate::{PipelineError, PipelineInput, ShareSource};

/// JSON value → raw share. Numbers and strings are kept, everything else is missing.
pub fn raw_share(v: &Value) -> RawShare {
    match v {
        Value::Number(n) => n.as_f64().map_or(RawShare::Missing, RawShare::Number),
        Value::String(s) => RawShare::Text(s.clone()),
        _ => RawShare::Missing,
    }
}

fn raw_map(m: &BTreeMap<PartyId, Value>) -> BTreeMap<PartyId, RawShare> {
    m.iter().map(|(k, v)| (k.clone(), raw_share(v))).collect()
}

fn number_map(m: &BTreeMap<PartyId, f64>) -> BTreeMap<PartyId, RawShare> {
    m.iter().map(|(k, v)| (k.clone(), RawShare::Number(*v))).collect()
}

impl PipelineInput {
    /// Empty input: no shares, no districts decided, ceil leveling, percent scale.
    pub fn new(corporation: Corporation, method: AllocationMethod) -> Self {
        Self {
            corporation,
            method,
            rounding: LevelingRounding::default(),
            scale: ShareScale::default(),
            source: ShareSource::Manual,
            shares: BTreeMap::new(),
            district_shares: BTreeMap::new(),
            independent: BTreeSet::new(),
            rejected_district_keys: Vec::new(),
        }
    }

    pub fn with_rounding(mut self, rounding: LevelingRounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_shares<I, V>(mut self, shares: I) -> Self
    where
        I: IntoIterator<Item = (PartyId, V)>,
        V: Into<RawShare>,
    {
        self.shares = shares.into_iter().map(|(k, v)| (k, v.into())).collect();
        self
    }

    pub fn with_district<I, V>(mut self, district: DistrictNo, shares: I) -> Self
    where
        I: IntoIterator<Item = (PartyId, V)>,
        V: Into<RawShare>,
    {
        self.district_shares
            .insert(district, shares.into_iter().map(|(k, v)| (k, v.into())).collect());
        self
    }

    pub fn with_independent(mut self, district: DistrictNo) -> Self {
        self.independent.insert(district);
        self
    }

    /// Overlay a scenario file. Empty sections leave the current values alone.
    pub fn with_scenario(mut self, scenario: &ScenarioFile) -> Self {
        if !scenario.shares.is_empty() {
            self.shares = raw_map(&scenario.shares);
            self.source = ShareSource::Scenario;
        }
        if !scenario.districts.is_empty() {
            self.district_shares.clear();
            for (key, shares) in &scenario.districts {
                match key.parse::<DistrictNo>() {
                    Ok(d) => {
                        self.district_shares.insert(d, raw_map(shares));
                    }
                    Err(_) => self.rejected_district_keys.push(key.clone()),
                }
            }
        }
        self.independent.extend(scenario.independent.iter().map(|n| DistrictNo(*n)));
        if let Some(scale) = scenario.scale {
            self.scale = scale;
        }
        debug!(
            shares = self.shares.len(),
            districts = self.district_shares.len(),
            independent = self.independent.len(),
            "scenario applied"
        );
        self
    }

    /// Overlay a results-feed snapshot, using the corporation's party mapping.
    ///
    /// A snapshot without any quick report is ignored. Feed areas that are not
    /// districts of the corporation are dropped.
    pub fn with_feed(mut self, rows: &[FeedRow]) -> Result<Self, PipelineError> {
        let mapping = match &self.corporation.feed {
            Some(cfg) if !cfg.party_mapping.is_empty() => cfg.party_mapping.clone(),
            _ => {
                return Err(PipelineError::Input(format!(
                    "corporation {:?} has no live-results party mapping",
                    self.corporation.name
                )))
            }
        };

        let summary = aggregate_feed(rows, &mapping);
        if !summary.has_reports {
            info!(rows = summary.rows, "feed has no quick reports yet; keeping other inputs");
            return Ok(self);
        }

        self.shares = number_map(&summary.shares);
        self.scale = ShareScale::Percent;
        self.source = ShareSource::Feed;

        let known: BTreeSet<DistrictNo> = self.corporation.districts.iter().map(|d| d.number).collect();
        let mut tallies = BTreeMap::new();
        for (d, votes) in &summary.district_tallies {
            if known.contains(d) {
                tallies.insert(*d, number_map(votes));
            } else {
                warn!(area = %d, "feed area is not a district of this corporation; dropped");
            }
        }
        if !tallies.is_empty() {
            self.district_shares = tallies;
        }
        info!(
            valid_votes = summary.valid_votes,
            districts = self.district_shares.len(),
            "feed applied"
        );
        Ok(self)
    }

    /// Fill whatever is still empty from the corporation's reference data.
    pub fn with_fallbacks(mut self) -> Self {
        if self.shares.is_empty() {
            match self.corporation.poll.poll_results.as_ref().filter(|p| !p.is_empty()) {
                Some(poll) => {
                    self.shares = number_map(poll);
                    self.source = ShareSource::Poll;
                }
                None => {
                    self.shares = number_map(&default_shares(&self.corporation.universe()));
                    self.source = ShareSource::Even;
                }
            }
            self.scale = ShareScale::Percent;
            info!(source = ?self.source, "party shares seeded");
        }
        if self.district_shares.is_empty() && !self.corporation.districts.is_empty() {
            self.district_shares = project_district_shares(&self.corporation)
                .iter()
                .map(|(d, m)| (*d, number_map(m)))
                .collect();
            debug!(districts = self.district_shares.len(), "district shares projected");
        }
        self
    }
}
