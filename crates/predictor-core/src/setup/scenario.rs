//! Scenario Files
//!
//! A scenario bundles a seed state, a world snapshot and an action list so a
//! pass can be reproduced from a single TOML or JSON file.

use predictor_types::{ScheduledAction, SimulationState};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::world::WorldSnapshot;

/// Inputs of one prediction pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub world: WorldSnapshot,
    #[serde(default)]
    pub seed: SimulationState,
    #[serde(default)]
    pub actions: Vec<ScheduledAction>,
}

impl Scenario {
    /// Loads a scenario, choosing the format from the file extension.
    /// Anything other than `.json` is read as TOML.
    pub fn from_file(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_toml(&content),
        }
    }

    pub fn from_toml(content: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json(content: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Errors that can occur while loading a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const EARLY_LOOP: &str = r#"
        [world]
        talent_rate = 0.05

        [seed.resources]
        mana = 250.0
        town = 0.0

        [seed.stats]
        Dex = 0.0

        [[actions]]
        name = "Wander"
        repeats = 1

        [[actions]]
        name = "Pick Locks"
        loops = 3
        disabled = true
    "#;

    #[test]
    fn test_toml_scenario() {
        let scenario = Scenario::from_toml(EARLY_LOOP).unwrap();
        assert_eq!(scenario.world.talent_rate, 0.05);
        assert_eq!(scenario.world.budget_resource, "mana");
        assert_eq!(scenario.seed.resource("mana"), 250.0);
        assert_eq!(scenario.actions.len(), 2);
        assert_eq!(scenario.actions[1], ScheduledAction::new("Pick Locks", 3).disabled());
    }

    #[test]
    fn test_json_scenario_from_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"seed": {{"resources": {{"mana": 100.0}}}}, "actions": [{{"name": "Wander", "repeats": 2}}]}}"#
        )
        .unwrap();
        let scenario = Scenario::from_file(file.path()).unwrap();
        assert_eq!(scenario.seed.resource("mana"), 100.0);
        assert_eq!(scenario.actions, vec![ScheduledAction::new("Wander", 2)]);
        assert_eq!(scenario.world, WorldSnapshot::default());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Scenario::from_file(&dir.path().join("none.toml")).unwrap_err();
        assert!(matches!(err, ScenarioError::Io(_)));
    }
}
