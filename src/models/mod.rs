//! Domain models for heroes, powers and the strengths that join them.
//!
//! # Entities
//!
//! - [`Hero`]: a named character. No field-level validation.
//! - [`Power`]: a named ability whose description must be at least
//!   [`MIN_DESCRIPTION_LEN`] characters long.
//! - [`HeroPower`]: the join between one hero and one power, carrying a
//!   [`Strength`].
//!
//! Heroes and powers own their hero powers: deleting either removes every
//! hero power that references it.
//!
//! # Rendering
//!
//! The `*Detail` types are the nested representations handed to clients.
//! Each one embeds the other side of the association exactly one level deep
//! so that no entity ever appears inside itself.

mod hero;
mod hero_power;
mod power;

pub use hero::*;
pub use hero_power::*;
pub use power::*;
