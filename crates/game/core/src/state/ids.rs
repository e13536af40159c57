use core::fmt;
use core::str::FromStr;

use crate::config::GameConfig;

/// Opaque identity of an actor tracked by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorId(pub u32);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Why a textual key was rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("key is empty")]
    Empty,

    #[error("key '{0}' is missing the 'namespace:' prefix")]
    MissingNamespace(String),

    #[error("key '{key}' contains invalid character {found:?}")]
    InvalidCharacter { key: String, found: char },
}

/// Validates `namespace:path` keys (lowercase ASCII, digits, `_ - . /`).
fn validate_key(raw: &str) -> Result<(), KeyError> {
    if raw.is_empty() {
        return Err(KeyError::Empty);
    }
    let Some((namespace, path)) = raw.split_once(':') else {
        return Err(KeyError::MissingNamespace(raw.to_owned()));
    };
    if namespace.is_empty() || path.is_empty() {
        return Err(KeyError::MissingNamespace(raw.to_owned()));
    }
    let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit() || "_-./".contains(c);
    if let Some(found) = namespace.chars().chain(path.chars()).find(|&c| !allowed(c)) {
        return Err(KeyError::InvalidCharacter {
            key: raw.to_owned(),
            found,
        });
    }
    Ok(())
}

macro_rules! string_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
        pub struct $name(String);

        impl $name {
            /// Parses and validates a key.
            pub fn new(raw: impl Into<String>) -> Result<Self, KeyError> {
                let raw = raw.into();
                validate_key(&raw)?;
                Ok(Self(raw))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = KeyError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = KeyError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_key!(
    /// Stable key of a skill definition, e.g. `seer:spirit_vision`.
    SkillId
);

string_key!(
    /// Stable key of a pathway, e.g. `lotm:seer`.
    PathwayId
);

/// Progression tier ("sequence"). Lower numbers are stronger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub struct Tier(u8);

impl Tier {
    /// The weakest tier.
    pub const WEAKEST: Self = Self(GameConfig::MAX_TIER);
    /// The strongest tier.
    pub const STRONGEST: Self = Self(0);

    pub fn new(value: u8) -> Result<Self, TierError> {
        if value > GameConfig::MAX_TIER {
            Err(TierError(value))
        } else {
            Ok(Self(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Distance from the weakest tier: 0 at sequence 9, 9 at sequence 0.
    pub const fn rank(self) -> u8 {
        GameConfig::MAX_TIER - self.0
    }

    /// Signed tier number used by contest math; `None` maps to one past the weakest tier.
    pub fn ordinal(tier: Option<Tier>) -> i32 {
        tier.map(|t| t.0 as i32)
            .unwrap_or(GameConfig::MAX_TIER as i32 + 1)
    }
}

impl Default for Tier {
    fn default() -> Self {
        Self::WEAKEST
    }
}

impl TryFrom<u8> for Tier {
    type Error = TierError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tier> for u8 {
    fn from(value: Tier) -> u8 {
        value.0
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sequence {}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("tier {0} is outside 0..=9")]
pub struct TierError(pub u8);
