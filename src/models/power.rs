use serde::{Deserialize, Serialize};

use super::{Hero, HeroPower};
use crate::error::{Error, Result};

/// Minimum number of characters in a power description.
pub const MIN_DESCRIPTION_LEN: usize = 20;

/// An ability that heroes can hold.
///
/// The description is always at least [`MIN_DESCRIPTION_LEN`] characters.
/// Every write path runs [`validate_description`] before touching the store,
/// so a stored power can never hold a shorter one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Power {
    pub id: i64,
    pub name: Option<String>,
    pub description: String,
}

/// Input for creating a new power.
///
/// A missing description is treated as empty and rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePowerInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Input for updating an existing power. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePowerInput {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Input for granting a power to a hero, from the power's side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddHeroInput {
    pub hero_id: Option<i64>,
    pub strength: Option<String>,
}

/// A power with its hero powers, each carrying the hero that holds it.
///
/// The nested hero powers never embed the power again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerDetail {
    #[serde(flatten)]
    pub power: Power,
    pub hero_powers: Vec<HeroPowerWithHero>,
}

/// A hero power as seen from its power.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroPowerWithHero {
    #[serde(flatten)]
    pub hero_power: HeroPower,
    pub hero: Hero,
}

/// Checks the description length in characters, not bytes.
///
/// Every character counts, including NUL. The store's CHECK measures bytes,
/// which is never fewer than characters, so anything accepted here is
/// accepted there too.
pub fn validate_description(description: &str) -> Result<()> {
    if description.chars().count() < MIN_DESCRIPTION_LEN {
        return Err(Error::validation(format!(
            "Description must be at least {MIN_DESCRIPTION_LEN} characters long"
        )));
    }
    Ok(())
}
