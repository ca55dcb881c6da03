//! Sample data fixtures for testing.
//!
//! Ready-made seeds and action lists for other crates to use.
//! Enable the `test-fixtures` feature to access these helpers.
//!
//! # Example
//!
//! ```ignore
//! // In your Cargo.toml:
//! // [dev-dependencies]
//! // predictor-types = { path = "../predictor-types", features = ["test-fixtures"] }
//!
//! use predictor_types::fixtures;
//!
//! let seed = fixtures::sample_seed();
//! let list = fixtures::sample_action_list();
//! ```

use crate::{ScheduledAction, SimulationState};

/// Stat names used by the sample data.
pub const SAMPLE_STATS: [&str; 9] = ["Dex", "Str", "Con", "Spd", "Per", "Cha", "Int", "Luck", "Soul"];

/// Starting mana of a fresh loop.
pub const SAMPLE_MANA: f64 = 250.0;

/// A fresh-loop seed: 250 mana in location 0, no experience.
pub fn sample_seed() -> SimulationState {
    let mut seed = SimulationState::new()
        .with_resource("mana", SAMPLE_MANA)
        .with_resource("town", 0.0);
    for stat in SAMPLE_STATS {
        seed = seed.with_stat(stat, 0.0);
    }
    seed.with_skill("combat", 0.0)
        .with_skill("magic", 0.0)
        .with_skill("restoration", 0.0)
}

/// An early-game action list mixing flat and looping actions.
pub fn sample_action_list() -> Vec<ScheduledAction> {
    vec![
        ScheduledAction::new("Wander", 1),
        ScheduledAction::new("Smash Pots", 10),
        ScheduledAction::new("Pick Locks", 5),
        ScheduledAction::new("Heal The Sick", 2),
        ScheduledAction::new("Fight Monsters", 3),
    ]
}
