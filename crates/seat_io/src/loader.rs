//! Loader: read local JSON metadata (election index → corporation index →
//! corporation) and scenario files, and normalize them into `seat_core`
//! entities. No network I/O.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use seat_core::{
    Corporation, District, DistrictNo, FeedConfig, ListCandidate, Party, PartyId, PollData,
    ShareScale,
};

use crate::{looks_like_url_strict, IoError, IoResult};

// ----------------------------- Wire-facing types -----------------------------

/// `seat-allocation` of an election entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatAllocationRef {
    pub key: String,
    #[serde(default)]
    pub name: String,
}

/// One entry of the election index (`elections.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ElectionEntry {
    pub election_name: String,
    pub data_source: String,
    pub seat_allocation: SeatAllocationRef,
}

/// One entry of a corporation index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CorporationIndexEntry {
    pub name: String,
    pub data_source: String,
}

/// Scenario: raw per-party and per-district inputs plus independent districts.
/// Raw values stay untyped here; the normalizer decides what survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScenarioFile {
    #[serde(default)]
    pub shares: BTreeMap<PartyId, Value>,
    /// District number (as text) → party → raw value.
    #[serde(default)]
    pub districts: BTreeMap<String, BTreeMap<PartyId, Value>>,
    #[serde(default)]
    pub independent: Vec<u32>,
    #[serde(default)]
    pub scale: Option<ShareScale>,
}

/// District numbers appear as JSON numbers or numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum NumOrText {
    Num(u32),
    Text(String),
}

impl NumOrText {
    fn district(&self) -> IoResult<DistrictNo> {
        match self {
            NumOrText::Num(n) => Ok(DistrictNo(*n)),
            NumOrText::Text(s) => s
                .parse()
                .map_err(|_| IoError::Invalid(format!("district number {s:?}"))),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ListCandidateWire {
    position: u32,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct DistrictCandidateWire {
    district_number: NumOrText,
    candidate_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct PartyWire {
    identifier: PartyId,
    #[serde(default)]
    shortname: String,
    #[serde(default)]
    colorcode: String,
    #[serde(default)]
    list_candidates: Vec<ListCandidateWire>,
    #[serde(default)]
    districts_candidates: Vec<DistrictCandidateWire>,
}

#[derive(Debug, Deserialize)]
struct DistrictWire {
    number: NumOrText,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct PastResultWire {
    #[serde(rename = "Prozent")]
    percent: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct LiveResultsWire {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    party_mapping: BTreeMap<String, PartyId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct CorporationWire {
    #[serde(default)]
    name: String,
    #[serde(rename = "cuncil-seats", alias = "council-seats")]
    council_seats: u32,
    #[serde(default)]
    parties: Vec<PartyWire>,
    #[serde(default)]
    districts: Vec<DistrictWire>,
    #[serde(default)]
    poll_results: Option<BTreeMap<PartyId, Value>>,
    #[serde(default)]
    past_results: Option<BTreeMap<PartyId, PastResultWire>>,
    #[serde(default)]
    past_district_results: Option<BTreeMap<String, BTreeMap<PartyId, Value>>>,
    #[serde(default)]
    live_results: Option<LiveResultsWire>,
}

/// Election entry resolved all the way down to its corporation.
#[derive(Debug, Clone)]
pub struct LoadedElection {
    pub election_key: String,
    pub entry: ElectionEntry,
    pub corporation_key: String,
    pub corporation: Corporation,
}

// ----------------------------- Helpers -----------------------------

fn read_json<T: DeserializeOwned>(path: &Path) -> IoResult<T> {
    if looks_like_url_strict(&path.to_string_lossy()) {
        return Err(IoError::UrlRejected(path.display().to_string()));
    }
    let f = File::open(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let v = serde_json::from_reader(BufReader::new(f))?;
    Ok(v)
}

/// Number or numeric string → f64. Anything else → `None`.
pub fn json_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number_map(raw: &BTreeMap<PartyId, Value>) -> BTreeMap<PartyId, f64> {
    raw.iter()
        .filter_map(|(k, v)| json_number(v).map(|x| (k.clone(), x)))
        .collect()
}

/// Resolve a `data-source` relative to the directory of the index file that names it.
pub fn resolve_data_source(index_path: &Path, data_source: &str) -> IoResult<PathBuf> {
    if looks_like_url_strict(data_source) {
        return Err(IoError::UrlRejected(data_source.to_string()));
    }
    let p = Path::new(data_source.trim());
    if p.is_absolute() {
        return Ok(p.to_path_buf());
    }
    let base = index_path.parent().unwrap_or_else(|| Path::new("."));
    Ok(base.join(p))
}

// ----------------------------- Loaders -----------------------------

pub fn load_elections(path: &Path) -> IoResult<BTreeMap<String, ElectionEntry>> {
    read_json(path)
}

pub fn load_corporation_index(path: &Path) -> IoResult<BTreeMap<String, CorporationIndexEntry>> {
    read_json(path)
}

/// Load a corporation file and normalize it (district roster keyed by number,
/// districts ascending, party order kept as given).
pub fn load_corporation(path: &Path) -> IoResult<Corporation> {
    let wire: CorporationWire = read_json(path)?;
    corporation_from_wire(wire)
}

/// Parse corporation JSON text (same normalization as `load_corporation`).
pub fn parse_corporation_str(text: &str) -> IoResult<Corporation> {
    let wire: CorporationWire = serde_json::from_str(text)?;
    corporation_from_wire(wire)
}

fn corporation_from_wire(wire: CorporationWire) -> IoResult<Corporation> {
    let mut seen_parties = BTreeSet::new();
    let mut parties = Vec::with_capacity(wire.parties.len());
    for p in wire.parties {
        if !seen_parties.insert(p.identifier.clone()) {
            return Err(IoError::Invalid(format!("duplicate party identifier {}", p.identifier)));
        }
        let mut district_candidates = BTreeMap::new();
        for dc in p.districts_candidates {
            let d = dc.district_number.district()?;
            if district_candidates.insert(d, dc.candidate_name).is_some() {
                warn!(party = %p.identifier, district = %d, "duplicate district candidate; last one kept");
            }
        }
        parties.push(Party {
            id: p.identifier,
            short_name: p.shortname,
            color: p.colorcode,
            list_candidates: p
                .list_candidates
                .into_iter()
                .map(|c| ListCandidate { position: c.position, name: c.name })
                .collect(),
            district_candidates,
        });
    }

    let mut districts = Vec::with_capacity(wire.districts.len());
    let mut seen_districts = BTreeSet::new();
    for d in wire.districts {
        let number = d.number.district()?;
        if !seen_districts.insert(number) {
            return Err(IoError::Invalid(format!("duplicate district number {number}")));
        }
        districts.push(District { number, name: d.name });
    }
    districts.sort_by_key(|d| d.number);

    let past_district_results = match wire.past_district_results {
        Some(m) => {
            let mut out = BTreeMap::new();
            for (k, row) in m {
                let d: DistrictNo = k
                    .parse()
                    .map_err(|_| IoError::Invalid(format!("past-district-results key {k:?}")))?;
                out.insert(d, number_map(&row));
            }
            Some(out)
        }
        None => None,
    };

    let poll = PollData {
        poll_results: wire.poll_results.as_ref().map(number_map),
        past_results: wire.past_results.map(|m| {
            m.into_iter()
                .filter_map(|(k, v)| json_number(&v.percent).map(|x| (k, x)))
                .collect()
        }),
        past_district_results,
    };

    let feed = wire.live_results.map(|l| FeedConfig {
        enabled: l.enabled,
        url: l.url,
        party_mapping: l.party_mapping,
    });

    debug!(
        name = %wire.name,
        seats = wire.council_seats,
        parties = parties.len(),
        districts = districts.len(),
        "corporation loaded"
    );

    Ok(Corporation {
        name: wire.name,
        council_seats: wire.council_seats,
        parties,
        districts,
        poll,
        feed,
    })
}

pub fn load_scenario(path: &Path) -> IoResult<ScenarioFile> {
    read_json(path)
}

/// elections.json → entry → corporation index → corporation file.
pub fn load_election_context(
    elections_path: &Path,
    election_key: &str,
    corporation_key: &str,
) -> IoResult<LoadedElection> {
    let elections = load_elections(elections_path)?;
    let entry = elections
        .get(election_key)
        .cloned()
        .ok_or_else(|| IoError::Invalid(format!("unknown election {election_key:?}")))?;

    let index_path = resolve_data_source(elections_path, &entry.data_source)?;
    let index = load_corporation_index(&index_path)?;
    let corp_entry = index
        .get(corporation_key)
        .ok_or_else(|| IoError::Invalid(format!("unknown corporation {corporation_key:?}")))?;

    let corp_path = resolve_data_source(&index_path, &corp_entry.data_source)?;
    let corporation = load_corporation(&corp_path)?;

    Ok(LoadedElection {
        election_key: election_key.to_string(),
        entry,
        corporation_key: corporation_key.to_string(),
        corporation,
    })
}
