//! Simulation State Types
//!
//! The running state of one prediction pass: resources, accumulated experience,
//! and per-action loop progression.
//!
//! Every map is a `BTreeMap` so that two states built from the same inputs
//! compare equal and serialize byte-for-byte identically. Cloning a state
//! yields a fully independent copy; this is what the incremental cache stores.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name → amount table used for resources and experience pools.
pub type Ledger = BTreeMap<String, f64>;

/// Adds `amount` to `name`, allocating a key only when the entry is new.
pub fn credit(ledger: &mut Ledger, name: &str, amount: f64) {
    match ledger.get_mut(name) {
        Some(value) => *value += amount,
        None => {
            ledger.insert(name.to_string(), amount);
        }
    }
}

/// Loop bookkeeping for one action within a pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    /// Progress accumulated within the current repeat, across its segments.
    pub progress: f64,
    /// Whole segments finished across all repeats.
    pub completed: u64,
    /// Whole repeats finished, including completions recorded before the pass.
    pub total: u64,
    /// Per-segment costs for the current repeat. Empty until first built.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cost_list: Vec<f64>,
    /// Values a loop computes once per repeat. Cleared when a repeat completes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub memo: BTreeMap<String, f64>,
}

impl ProgressionState {
    /// Creates progression for an action already completed `total` times.
    pub fn with_total(total: u64) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    /// Returns the memoized value for `key`, computing it on first use.
    pub fn memoize(&mut self, key: &str, compute: impl FnOnce() -> f64) -> f64 {
        if let Some(value) = self.memo.get(key) {
            return *value;
        }
        let value = compute();
        self.memo.insert(key.to_string(), value);
        value
    }

    /// Whole repeats completed within this pass, given the segment count.
    pub fn repeats_completed(&self, segments: usize) -> u64 {
        if segments == 0 {
            return 0;
        }
        self.completed / segments as u64
    }
}

/// Complete mutable state of a prediction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Spendable and collectable quantities, including the budget and location marker.
    #[serde(default)]
    pub resources: Ledger,
    /// Stat experience.
    #[serde(default)]
    pub stats: Ledger,
    /// Skill experience.
    #[serde(default)]
    pub skills: Ledger,
    /// Talent experience per stat.
    #[serde(default)]
    pub talents: Ledger,
    /// Loop progression keyed by action name.
    #[serde(default)]
    pub progress: BTreeMap<String, ProgressionState>,
    /// Completed segments divided by segment count, keyed by action name.
    #[serde(default)]
    pub curr_progress: Ledger,
    /// Game ticks elapsed since the start of the pass.
    #[serde(default)]
    pub ticks: f64,
}

impl SimulationState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a resource, treating absent entries as zero.
    pub fn resource(&self, name: &str) -> f64 {
        self.resources.get(name).copied().unwrap_or(0.0)
    }

    /// Sets a resource value.
    pub fn set_resource(&mut self, name: impl Into<String>, value: f64) {
        self.resources.insert(name.into(), value);
    }

    /// Adds to a resource, creating it at zero first if absent.
    pub fn add_resource(&mut self, name: &str, amount: f64) {
        credit(&mut self.resources, name, amount);
    }

    /// Inserts a zero entry for every name not already present.
    pub fn ensure_resources<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.resources.entry(name.to_string()).or_insert(0.0);
        }
    }

    /// Builder-style resource initialiser.
    pub fn with_resource(mut self, name: impl Into<String>, value: f64) -> Self {
        self.resources.insert(name.into(), value);
        self
    }

    /// Builder-style stat initialiser. Also seeds an empty talent pool.
    pub fn with_stat(mut self, name: impl Into<String>, exp: f64) -> Self {
        let name = name.into();
        self.talents.entry(name.clone()).or_insert(0.0);
        self.stats.insert(name, exp);
        self
    }

    /// Builder-style skill initialiser.
    pub fn with_skill(mut self, name: impl Into<String>, exp: f64) -> Self {
        self.skills.insert(name.into(), exp);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_defaults_to_zero() {
        let state = SimulationState::new();
        assert_eq!(state.resource("gold"), 0.0);
    }

    #[test]
    fn test_add_resource_creates_entry() {
        let mut state = SimulationState::new();
        state.add_resource("gold", 5.0);
        state.add_resource("gold", 2.5);
        assert_eq!(state.resource("gold"), 7.5);
    }

    #[test]
    fn test_credit_updates_in_place() {
        let mut ledger = Ledger::new();
        credit(&mut ledger, "Str", 3.0);
        credit(&mut ledger, "Str", -1.0);
        credit(&mut ledger, "Dex", 0.5);
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger["Str"], 2.0);
        assert_eq!(ledger["Dex"], 0.5);
    }

    #[test]
    fn test_ensure_resources_keeps_existing_values() {
        let mut state = SimulationState::new().with_resource("mana", 250.0);
        state.ensure_resources(["mana", "rep"]);
        assert_eq!(state.resource("mana"), 250.0);
        assert_eq!(state.resources.get("rep"), Some(&0.0));
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = SimulationState::new().with_resource("mana", 100.0);
        original
            .progress
            .insert("Heal".to_string(), ProgressionState::with_total(3));

        let copy = original.clone();
        original.add_resource("mana", -50.0);
        if let Some(p) = original.progress.get_mut("Heal") {
            p.completed = 9;
            p.cost_list.push(1.0);
        }

        assert_eq!(copy.resource("mana"), 100.0);
        assert_eq!(copy.progress["Heal"].completed, 0);
        assert!(copy.progress["Heal"].cost_list.is_empty());
        assert_ne!(copy, original);
    }

    #[test]
    fn test_memoize_computes_once() {
        let mut progression = ProgressionState::default();
        let mut calls = 0;
        let first = progression.memoize("strength", || {
            calls += 1;
            12.0
        });
        let second = progression.memoize("strength", || 99.0);
        assert_eq!(first, 12.0);
        assert_eq!(second, 12.0);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_repeats_completed() {
        let progression = ProgressionState {
            completed: 7,
            ..Default::default()
        };
        assert_eq!(progression.repeats_completed(3), 2);
        assert_eq!(progression.repeats_completed(0), 0);
    }

    #[test]
    fn test_state_serialization_is_stable() {
        let a = SimulationState::new()
            .with_resource("mana", 250.0)
            .with_resource("gold", 0.0)
            .with_stat("Str", 10.0);
        let b = SimulationState::new()
            .with_stat("Str", 10.0)
            .with_resource("gold", 0.0)
            .with_resource("mana", 250.0);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
