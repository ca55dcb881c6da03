//! Action List Types
//!
//! The user's scheduled action list and the statistic the user wants tracked.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One entry of the action list, as scheduled by the player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledAction {
    pub name: String,
    /// Number of times the action should repeat.
    #[serde(alias = "loops")]
    pub repeats: u64,
    #[serde(default)]
    pub disabled: bool,
}

impl ScheduledAction {
    pub fn new(name: impl Into<String>, repeats: u64) -> Self {
        Self {
            name: name.into(),
            repeats,
            disabled: false,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }
}

/// Index of the last entry that is not disabled.
///
/// Falls back to index 0 when every entry is disabled, and `None` for an
/// empty list.
pub fn final_active_index(actions: &[ScheduledAction]) -> Option<usize> {
    if actions.is_empty() {
        return None;
    }
    let mut index = actions.len() - 1;
    while index > 0 && actions[index].disabled {
        index -= 1;
    }
    Some(index)
}

/// Quantity whose per-minute throughput is reported for the whole list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum TrackedStat {
    /// Net change of a resource.
    Resource(String),
    /// Skill experience gained.
    Skill(String),
    /// Talent experience gained for a stat.
    Talent(String),
    /// Repeats completed by the final active action.
    FinalActions,
}

impl Default for TrackedStat {
    fn default() -> Self {
        TrackedStat::Resource("soul".to_string())
    }
}

impl fmt::Display for TrackedStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackedStat::Resource(name) => write!(f, "resource:{}", name),
            TrackedStat::Skill(name) => write!(f, "skill:{}", name),
            TrackedStat::Talent(name) => write!(f, "talent:{}", name),
            TrackedStat::FinalActions => write!(f, "final_actions"),
        }
    }
}

/// Error type for parsing a tracked statistic from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseTrackedStatError(pub String);

impl fmt::Display for ParseTrackedStatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid tracked statistic '{}', expected 'resource:NAME', 'skill:NAME', 'talent:NAME' or 'final_actions'",
            self.0
        )
    }
}

impl std::error::Error for ParseTrackedStatError {}

impl FromStr for TrackedStat {
    type Err = ParseTrackedStatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "final_actions" {
            return Ok(TrackedStat::FinalActions);
        }
        let (kind, name) = s
            .split_once(':')
            .ok_or_else(|| ParseTrackedStatError(s.to_string()))?;
        if name.is_empty() {
            return Err(ParseTrackedStatError(s.to_string()));
        }
        match kind {
            "resource" => Ok(TrackedStat::Resource(name.to_string())),
            "skill" => Ok(TrackedStat::Skill(name.to_string())),
            "talent" => Ok(TrackedStat::Talent(name.to_string())),
            _ => Err(ParseTrackedStatError(s.to_string())),
        }
    }
}
