//! World Snapshot
//!
//! Read-only game tables a pass needs besides the simulation state. The host
//! builds one snapshot per pass and hands it to the predictor; nothing in the
//! engine reads game data from anywhere else.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::stats;

/// Default name of the budget resource.
pub const DEFAULT_BUDGET_RESOURCE: &str = "mana";

/// Default name of the location marker resource.
pub const DEFAULT_LOCATION_RESOURCE: &str = "town";

fn default_budget_resource() -> String {
    DEFAULT_BUDGET_RESOURCE.to_string()
}

fn default_location_resource() -> String {
    DEFAULT_LOCATION_RESOURCE.to_string()
}

/// Game tables consulted during a pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Resource consumed one unit per tick.
    #[serde(default = "default_budget_resource")]
    pub budget_resource: String,
    /// Resource holding the current location index.
    #[serde(default = "default_location_resource")]
    pub location_resource: String,
    /// Fraction of stat experience that also flows into the talent pool.
    #[serde(default)]
    pub talent_rate: f64,
    /// Experience multiplier per stat. Absent stats use 1.
    #[serde(default)]
    pub soulstone_multipliers: BTreeMap<String, f64>,
    /// Game speed per location index. Absent locations run at speed 1.
    #[serde(default)]
    pub speed_multipliers: Vec<f64>,
    /// Repeats of each looping action completed before the pass.
    #[serde(default)]
    pub prior_completions: BTreeMap<String, u64>,
}

impl Default for WorldSnapshot {
    fn default() -> Self {
        Self {
            budget_resource: default_budget_resource(),
            location_resource: default_location_resource(),
            talent_rate: 0.0,
            soulstone_multipliers: BTreeMap::new(),
            speed_multipliers: Vec::new(),
            prior_completions: BTreeMap::new(),
        }
    }
}

impl WorldSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_talent_rate(mut self, rate: f64) -> Self {
        self.talent_rate = rate;
        self
    }

    pub fn with_prior_completions(mut self, action: impl Into<String>, total: u64) -> Self {
        self.prior_completions.insert(action.into(), total);
        self
    }

    pub fn with_speed(mut self, location: usize, multiplier: f64) -> Self {
        if self.speed_multipliers.len() <= location {
            self.speed_multipliers.resize(location + 1, 1.0);
        }
        self.speed_multipliers[location] = multiplier;
        self
    }

    /// Experience multiplier for a stat with the given talent experience.
    pub fn bonus_multiplier(&self, stat: &str, talent_exp: f64) -> f64 {
        let soulstone = self.soulstone_multipliers.get(stat).copied().unwrap_or(1.0);
        stats::bonus_multiplier(soulstone, talent_exp)
    }

    /// Game speed at a location. Non-positive or unknown entries count as 1.
    pub fn speed_multiplier(&self, location: f64) -> f64 {
        if !location.is_finite() || location < 0.0 {
            return 1.0;
        }
        match self.speed_multipliers.get(location as usize) {
            Some(speed) if *speed > 0.0 => *speed,
            _ => 1.0,
        }
    }

    /// Completions recorded for an action before the pass started.
    pub fn prior_completions(&self, action: &str) -> u64 {
        self.prior_completions.get(action).copied().unwrap_or(0)
    }
}
