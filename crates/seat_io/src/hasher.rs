//! crates/seat_io/src/hasher.rs
//!
//! SHA-256 fingerprints. Hex digests are lowercase.
//! - `sha256_canonical(..)` for serializable values (goes through canonical_json).
//! - `sha256_hex(..)` for raw bytes (feed snapshots as read from disk).

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::canonical_json::to_canonical_json_bytes;
use crate::IoResult;

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// SHA-256 over the canonical JSON bytes of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> IoResult<String> {
    let v = serde_json::to_value(value)?;
    Ok(sha256_hex(&to_canonical_json_bytes(&v)))
}
