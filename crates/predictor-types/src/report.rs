//! Prediction Report Types
//!
//! Structured results of a prediction pass. No formatting or styling lives
//! here; hosts decide how to present these values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::TrackedStat;

/// A value after an entry and its change relative to before the entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueChange {
    pub value: f64,
    pub delta: f64,
}

impl ValueChange {
    pub fn between(before: f64, after: f64) -> Self {
        Self {
            value: after,
            delta: after - before,
        }
    }
}

/// Level reached after an entry and how many levels it gained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelChange {
    pub level: u64,
    pub delta: i64,
}

/// Projection for one entry of the action list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPrediction {
    /// Whether every executed repeat was affordable and allowed.
    pub valid: bool,
    /// Every resource affected by any action in the list.
    pub resources: BTreeMap<String, ValueChange>,
    /// Stats whose level changed during this entry.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stat_levels: BTreeMap<String, LevelChange>,
    /// Skills whose level changed during this entry.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub skill_levels: BTreeMap<String, LevelChange>,
    /// Loop progress (completed repeats, fractional) that changed during this entry.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub loop_progress: BTreeMap<String, ValueChange>,
    /// Game ticks elapsed by this entry.
    pub ticks: f64,
    /// Game ticks elapsed since the start of the list.
    pub total_ticks: f64,
    /// Repeats executed for this entry.
    pub repeats: u64,
}

/// Outcome of one entry of the action list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryOutcome {
    /// The catalog has no definition for this action name.
    NoPrediction,
    Predicted(EntryPrediction),
}

impl EntryOutcome {
    pub fn prediction(&self) -> Option<&EntryPrediction> {
        match self {
            EntryOutcome::NoPrediction => None,
            EntryOutcome::Predicted(p) => Some(p),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.prediction().map(|p| p.valid).unwrap_or(false)
    }
}

/// One row of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryReport {
    pub index: usize,
    pub name: String,
    #[serde(flatten)]
    pub outcome: EntryOutcome,
}

/// Throughput of the tracked statistic across the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticReport {
    pub tracked: TrackedStat,
    /// Amount gained over the list.
    pub gained: f64,
    /// Amount gained per minute of game time; zero when no time elapsed.
    pub per_minute: f64,
}

/// Result of a completed prediction pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionReport {
    pub entries: Vec<EntryReport>,
    /// Budget consumed by the whole list.
    pub total_spent: f64,
    /// Game ticks elapsed by the whole list.
    pub total_ticks: f64,
    pub statistic: StatisticReport,
}

impl PredictionReport {
    /// Entry report for a list index.
    pub fn entry(&self, index: usize) -> Option<&EntryReport> {
        self.entries.get(index)
    }

    /// Returns true if every predicted entry is valid.
    pub fn all_valid(&self) -> bool {
        self.entries
            .iter()
            .filter_map(|e| e.outcome.prediction())
            .all(|p| p.valid)
    }
}
