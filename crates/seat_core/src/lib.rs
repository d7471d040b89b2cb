//! seat_core: Core types, domains and ordering helpers for the seat engine.
//!
//! This crate is **I/O-free**. It defines the stable types shared across the
//! workspace (`seat_algo`, `seat_io`, `seat_pipeline`, `seat_cli`).
//!
//! - Registry tokens: `PartyId`, `DistrictNo`
//! - Entities: `Party`, `District`, `Corporation` and the seat/vote map aliases
//! - Domains: `AllocationMethod`, `LevelingRounding`, `ShareScale`
//! - Deterministic party order (`PartyUniverse`) used for every tie-break
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod errors {
    use thiserror::Error;

    /// Error set for core-domain validation & parsing.
    #[derive(Clone, Debug, Eq, PartialEq, Error)]
    pub enum CoreError {
        #[error("invalid token: {0:?}")]
        InvalidToken(String),
        #[error("invalid district number: {0:?}")]
        InvalidDistrict(String),
        #[error("unknown allocation method: {0:?}")]
        UnknownMethod(String),
        #[error("domain out of range: {0}")]
        DomainOutOfRange(&'static str),
    }
}

pub mod tokens {
    //! Registry token types (`PartyId`, `DistrictNo`) with strict shapes.

    use crate::errors::CoreError;
    use core::fmt;
    use core::str::FromStr;

    fn is_token(s: &str) -> bool {
        let len = s.len();
        if !(1..=64).contains(&len) {
            return false;
        }
        s.bytes().all(|b| {
            matches!(b,
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' |
                b'_' | b'-' | b':' | b'.'
            )
        })
    }

    macro_rules! def_token {
        ($name:ident) => {
            #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
            #[cfg_attr(feature = "serde", derive(serde::Serialize))]
            #[cfg_attr(feature = "serde", serde(transparent))]
            pub struct $name(String);

            impl $name {
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl FromStr for $name {
                type Err = CoreError;
                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    if is_token(s) {
                        Ok(Self(s.to_string()))
                    } else {
                        Err(CoreError::InvalidToken(s.to_string()))
                    }
                }
            }

            #[cfg(feature = "serde")]
            impl<'de> serde::Deserialize<'de> for $name {
                fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                    use serde::de::{Error as _, Unexpected};
                    let s = String::deserialize(d)?;
                    if is_token(&s) {
                        Ok(Self(s))
                    } else {
                        Err(D::Error::invalid_value(
                            Unexpected::Str(&s),
                            &"token [A-Za-z0-9_.:-], len 1..=64",
                        ))
                    }
                }
            }
        };
    }

    def_token!(PartyId);

    /// Electoral district number (unique within a corporation).
    #[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct DistrictNo(pub u32);

    impl DistrictNo {
        pub fn get(self) -> u32 {
            self.0
        }
    }

    impl From<u32> for DistrictNo {
        fn from(n: u32) -> Self {
            Self(n)
        }
    }

    impl fmt::Display for DistrictNo {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.0)
        }
    }

    impl FromStr for DistrictNo {
        type Err = CoreError;
        fn from_str(s: &str) -> Result<Self, Self::Err> {
            s.trim()
                .parse::<u32>()
                .map(Self)
                .map_err(|_| CoreError::InvalidDistrict(s.to_string()))
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn party_token_shape() {
            assert!("cdu".parse::<PartyId>().is_ok());
            assert!("die-linke.2".parse::<PartyId>().is_ok());
            assert!("".parse::<PartyId>().is_err());
            assert!("grüne".parse::<PartyId>().is_err());
            assert!("a b".parse::<PartyId>().is_err());
        }

        #[test]
        fn district_number_parses_trimmed() {
            assert_eq!(" 12 ".parse::<DistrictNo>().unwrap(), DistrictNo(12));
            assert!("x1".parse::<DistrictNo>().is_err());
        }
    }
}

pub mod determinism;
pub mod entities;
pub mod variables;

pub use determinism::PartyUniverse;
pub use entities::{
    Corporation, DirectMandateMap, District, FeedConfig, ListCandidate, Party, PollData, SeatMap,
    VoteShareMap,
};
pub use errors::CoreError;
pub use tokens::{DistrictNo, PartyId};
pub use variables::{AllocationMethod, LevelingRounding, ShareScale};
