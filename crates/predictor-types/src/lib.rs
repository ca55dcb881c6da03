//! Shared data types for the loop predictor.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod action;
pub mod report;
pub mod state;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

// Re-export action list types
pub use action::{final_active_index, ParseTrackedStatError, ScheduledAction, TrackedStat};

// Re-export state types
pub use state::{credit, Ledger, ProgressionState, SimulationState};

// Re-export report types
pub use report::{
    EntryOutcome, EntryPrediction, EntryReport, LevelChange, PredictionReport, StatisticReport,
    ValueChange,
};
