//! Sample data for local development.

use crate::db::Database;
use crate::error::Result;
use crate::models::*;

const HEROES: &[(&str, &str)] = &[
    ("Kamala Khan", "Ms. Marvel"),
    ("Doreen Green", "Squirrel Girl"),
    ("Gwen Stacy", "Spider-Gwen"),
    ("Janet Van Dyne", "The Wasp"),
    ("Wanda Maximoff", "Scarlet Witch"),
    ("Carol Danvers", "Captain Marvel"),
    ("Jean Grey", "Dark Phoenix"),
    ("Ororo Munroe", "Storm"),
    ("Kitty Pryde", "Shadowcat"),
    ("Elektra Natchios", "Elektra"),
];

const POWERS: &[(&str, &str)] = &[
    ("super strength", "gives the wielder super-human strengths"),
    (
        "flight",
        "gives the wielder the ability to fly through the skies at supersonic speed",
    ),
    (
        "super human senses",
        "allows the wielder to use her senses at a super-human level",
    ),
    ("elasticity", "can stretch the human body to extreme lengths"),
];

/// (hero index, power index, strength)
const HERO_POWERS: &[(usize, usize, &str)] = &[
    (0, 3, "Strong"),
    (1, 0, "Average"),
    (2, 2, "Strong"),
    (3, 1, "Weak"),
    (4, 2, "Average"),
    (5, 0, "Strong"),
    (5, 1, "Strong"),
    (6, 1, "Average"),
    (7, 1, "Strong"),
    (8, 2, "Weak"),
    (9, 0, "Average"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub heroes: usize,
    pub powers: usize,
    pub hero_powers: usize,
}

/// Replaces the store's contents with the sample set.
///
/// Everything goes through the validated operations, so the sample set is
/// held to the same rules as client input. The clear and every insert share
/// one transaction: if any row is rejected, the previous contents stay.
pub fn seed(db: &Database) -> Result<SeedSummary> {
    seed_with(db, HEROES, POWERS, HERO_POWERS)
}

fn seed_with(
    db: &Database,
    heroes: &[(&str, &str)],
    powers: &[(&str, &str)],
    hero_powers: &[(usize, usize, &str)],
) -> Result<SeedSummary> {
    let summary = db.batch(|batch| {
        tracing::info!("Clearing existing data");
        batch.clear()?;

        let heroes = heroes
            .iter()
            .map(|(name, super_name)| {
                batch.create_hero(CreateHeroInput {
                    name: Some(name.to_string()),
                    super_name: Some(super_name.to_string()),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let powers = powers
            .iter()
            .map(|(name, description)| {
                batch.create_power(CreatePowerInput {
                    name: Some(name.to_string()),
                    description: Some(description.to_string()),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        for (hero, power, strength) in hero_powers {
            batch.create_hero_power(CreateHeroPowerInput {
                hero_id: Some(heroes[*hero].id),
                power_id: Some(powers[*power].id),
                strength: Some(strength.to_string()),
            })?;
        }

        Ok(SeedSummary {
            heroes: heroes.len(),
            powers: powers.len(),
            hero_powers: hero_powers.len(),
        })
    })?;

    tracing::info!(?summary, "Seeded database");
    Ok(summary)
}
