use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{Hero, Power};
use crate::error::{Error, Result};

/// The link between one hero and one power.
///
/// A hero power never outlives its hero or its power. Its strength is
/// checked on creation and on every update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroPower {
    pub id: i64,
    pub strength: Strength,
    pub hero_id: i64,
    pub power_id: i64,
}

/// How strongly a hero wields a power.
///
/// Parsing is case-sensitive: `"strong"` is not a strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strength {
    Strong,
    Weak,
    Average,
}

impl Strength {
    pub const ALL: [Strength; 3] = [Self::Strong, Self::Weak, Self::Average];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Weak => "Weak",
            Self::Average => "Average",
        }
    }
}

impl fmt::Display for Strength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strength {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|strength| strength.as_str() == s)
            .ok_or_else(|| Error::validation("Strength must be one of: Strong, Weak, Average"))
    }
}

/// Validates a raw strength from client input. A missing strength is rejected.
pub fn validate_strength(strength: Option<&str>) -> Result<Strength> {
    strength
        .ok_or_else(|| Error::validation("Strength is required"))?
        .parse()
}

/// Input for creating a hero power.
///
/// Every field is optional on the wire so that a missing one surfaces as a
/// validation error rather than a decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateHeroPowerInput {
    pub hero_id: Option<i64>,
    pub power_id: Option<i64>,
    pub strength: Option<String>,
}

/// Input for updating a hero power.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHeroPowerInput {
    pub strength: Option<String>,
}

/// A hero power with both of its owners, neither of which lists its hero powers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroPowerDetail {
    #[serde(flatten)]
    pub hero_power: HeroPower,
    pub hero: Hero,
    pub power: Power,
}
