//! crates/seat_io/src/lib.rs
//! Local-file I/O for the seat engine.
//!
//! - Shared error type (`IoError`) with `From` conversions used across modules.
//! - Offline posture: any `<scheme>://` path is rejected before it is opened.
//! - Details live in submodules: `loader` (metadata + scenarios), `feed`
//!   (`;`-delimited snapshots), `canonical_json`, `hasher`.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for seat_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors.
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON (de)serialization errors with a location hint.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Malformed feed snapshot.
    #[error("feed error: {0}")]
    Feed(String),

    /// A remote location where a local path was required.
    #[error("url not allowed (offline): {0}")]
    UrlRejected(String),

    /// Well-formed input that breaks a metadata invariant.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json reports line/column rather than a pointer.
        IoError::Json {
            pointer: format!("line {}, column {}", e.line(), e.column()),
            msg: e.to_string(),
        }
    }
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        IoError::Feed(e.to_string())
    }
}

pub mod canonical_json;
pub mod feed;
pub mod hasher;
pub mod loader;

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    s.trim().contains("://")
}

pub mod prelude {
    pub use crate::{looks_like_url_strict, IoError, IoResult};

    pub use crate::canonical_json::{to_canonical_json_bytes, write_canonical_file};
    pub use crate::feed::{load_feed, parse_feed_str};
    pub use crate::hasher::{sha256_canonical, sha256_hex};
    pub use crate::loader::{
        load_corporation, load_corporation_index, load_election_context, load_elections,
        load_scenario, resolve_data_source, CorporationIndexEntry, ElectionEntry, LoadedElection,
        ScenarioFile,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_detection_is_strict() {
        assert!(looks_like_url_strict("https://wahlen.example/x.csv"));
        assert!(looks_like_url_strict(" file:///tmp/x "));
        assert!(!looks_like_url_strict("data/corporations/koeln.json"));
    }
}
