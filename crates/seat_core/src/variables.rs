//! variables.rs: Canonical domains with explicit wire tokens.

use core::fmt;
use core::str::FromStr;

use crate::errors::CoreError;

/// Define an enum with explicit wire tokens, `FromStr`/`Display` and
/// (feature-gated) serde derives.
macro_rules! token_enum {
    ($(#[$meta:meta])* $name:ident, $err:expr => { $($variant:ident = $token:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        pub enum $name {
            $(
                #[cfg_attr(feature = "serde", serde(rename = $token))]
                $variant,
            )+
        }

        impl $name {
            pub fn as_token(self) -> &'static str {
                match self {
                    $( $name::$variant => $token, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_token())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $( $token => Ok($name::$variant), )+
                    other => Err($err(other)),
                }
            }
        }
    };
}

token_enum!(
    /// Seat apportionment procedure.
    AllocationMethod, |s: &str| CoreError::UnknownMethod(s.to_string()) => {
        SainteLague = "sainte-lague",
        MixedMember = "rock",
    }
);

token_enum!(
    /// Rounding of `max_ratio × seats` when deriving the leveled council size.
    LevelingRounding, |_s: &str| CoreError::DomainOutOfRange("leveling rounding") => {
        Ceil = "ceil",
        Floor = "floor",
    }
);

token_enum!(
    /// Scale of the supplied vote shares. Percentages are bounded by 100.
    ShareScale, |_s: &str| CoreError::DomainOutOfRange("share scale") => {
        Percent = "percent",
        Tally = "tally",
    }
);

impl Default for LevelingRounding {
    fn default() -> Self {
        LevelingRounding::Ceil
    }
}

impl Default for ShareScale {
    fn default() -> Self {
        ShareScale::Percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_tokens_roundtrip() {
        assert_eq!("rock".parse::<AllocationMethod>(), Ok(AllocationMethod::MixedMember));
        assert_eq!(
            "sainte-lague".parse::<AllocationMethod>(),
            Ok(AllocationMethod::SainteLague)
        );
        assert_eq!(AllocationMethod::MixedMember.to_string(), "rock");
    }

    #[test]
    fn unknown_method_is_an_error() {
        assert_eq!(
            "dhondt".parse::<AllocationMethod>(),
            Err(CoreError::UnknownMethod("dhondt".into()))
        );
    }

    #[test]
    fn defaults() {
        assert_eq!(LevelingRounding::default(), LevelingRounding::Ceil);
        assert_eq!(ShareScale::default(), ShareScale::Percent);
    }
}
