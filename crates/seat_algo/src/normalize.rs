//! Vote-share normalization.
//!
//! Raw inputs come from free-text fields and feed cells: numbers, numeric
//! strings, or nothing. Only finite, strictly positive values survive; every
//! other input is dropped silently (absent, never a zero-valued entry).

use std::collections::BTreeMap;

use seat_core::{PartyId, VoteShareMap};

/// One raw per-party input value.
#[derive(Clone, Debug, PartialEq)]
pub enum RawShare {
    Number(f64),
    Text(String),
    Missing,
}

impl From<f64> for RawShare {
    fn from(v: f64) -> Self {
        RawShare::Number(v)
    }
}

impl From<&str> for RawShare {
    fn from(s: &str) -> Self {
        RawShare::Text(s.to_string())
    }
}

impl<T: Into<RawShare>> From<Option<T>> for RawShare {
    fn from(v: Option<T>) -> Self {
        v.map_or(RawShare::Missing, Into::into)
    }
}

/// Parse a single value; `None` unless finite and > 0. Text is trimmed.
pub fn parse_share(raw: &RawShare) -> Option<f64> {
    let v = match raw {
        RawShare::Number(v) => *v,
        RawShare::Text(s) => s.trim().parse::<f64>().ok()?,
        RawShare::Missing => return None,
    };
    (v.is_finite() && v > 0.0).then_some(v)
}

/// Normalize a party → raw value map into a `VoteShareMap`.
pub fn normalize_shares(raw: &BTreeMap<PartyId, RawShare>) -> VoteShareMap {
    raw.iter()
        .filter_map(|(id, r)| parse_share(r).map(|v| (id.clone(), v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(s: &str) -> PartyId {
        s.parse().unwrap()
    }

    #[test]
    fn keeps_only_positive_finite_values() {
        let raw: BTreeMap<PartyId, RawShare> = [
            (pid("a"), RawShare::from(" 12.5 ")),
            (pid("b"), RawShare::from("0")),
            (pid("c"), RawShare::from("abc")),
            (pid("d"), RawShare::Missing),
            (pid("e"), RawShare::Number(f64::NAN)),
            (pid("f"), RawShare::Number(-3.0)),
            (pid("g"), RawShare::Number(f64::INFINITY)),
            (pid("h"), RawShare::Number(7.0)),
            (pid("i"), RawShare::from("")),
        ]
        .into_iter()
        .collect();

        let out = normalize_shares(&raw);
        assert_eq!(out.len(), 2);
        assert_eq!(out.get(&pid("a")), Some(&12.5));
        assert_eq!(out.get(&pid("h")), Some(&7.0));
    }

    #[test]
    fn option_converts_to_missing() {
        assert_eq!(RawShare::from(None::<f64>), RawShare::Missing);
        assert_eq!(parse_share(&RawShare::from(Some(2.0))), Some(2.0));
    }
}
