use serde::{Deserialize, Serialize};

use super::{HeroPower, Power};

/// A character that can hold any number of powers.
///
/// Heroes carry no field-level invariants. They own their [`HeroPower`]
/// records: deleting a hero deletes every hero power that references it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub id: i64,
    pub name: Option<String>,
    pub super_name: Option<String>,
}

/// Input for creating a new hero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateHeroInput {
    pub name: Option<String>,
    pub super_name: Option<String>,
}

/// Input for updating an existing hero. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateHeroInput {
    pub name: Option<String>,
    pub super_name: Option<String>,
}

/// Input for granting a power to a hero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddPowerInput {
    pub power_id: Option<i64>,
    pub strength: Option<String>,
}

/// A hero with its hero powers, each carrying the power it grants.
///
/// The nested hero powers never embed the hero again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroDetail {
    #[serde(flatten)]
    pub hero: Hero,
    pub hero_powers: Vec<HeroPowerWithPower>,
}

/// A hero power as seen from its hero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroPowerWithPower {
    #[serde(flatten)]
    pub hero_power: HeroPower,
    pub power: Power,
}
