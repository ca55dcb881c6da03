//! Report Building
//!
//! Turns the states before and after an entry into the structured rows of a
//! [`PredictionReport`], and computes the tracked statistic for a whole list.

use predictor_types::{
    EntryPrediction, LevelChange, Ledger, SimulationState, StatisticReport, TrackedStat, ValueChange,
};
use std::collections::BTreeMap;

use crate::stats;

/// Changes produced by one entry.
pub fn entry_prediction(
    before: &SimulationState,
    after: &SimulationState,
    affected: &[String],
    valid: bool,
    repeats: u64,
) -> EntryPrediction {
    let resources = affected
        .iter()
        .map(|name| {
            (
                name.clone(),
                ValueChange::between(before.resource(name), after.resource(name)),
            )
        })
        .collect();

    let loop_progress = after
        .curr_progress
        .iter()
        .filter_map(|(name, value)| {
            let previous = before.curr_progress.get(name).copied().unwrap_or(0.0);
            (*value != previous).then(|| (name.clone(), ValueChange::between(previous, *value)))
        })
        .collect();

    EntryPrediction {
        valid,
        resources,
        stat_levels: level_changes(&before.stats, &after.stats),
        skill_levels: level_changes(&before.skills, &after.skills),
        loop_progress,
        ticks: after.ticks - before.ticks,
        total_ticks: after.ticks,
        repeats,
    }
}

fn level_changes(before: &Ledger, after: &Ledger) -> BTreeMap<String, LevelChange> {
    after
        .iter()
        .filter_map(|(name, exp)| {
            let level = stats::level_from_exp(*exp);
            let previous = stats::level_from_exp(before.get(name).copied().unwrap_or(0.0));
            (level != previous).then(|| {
                (
                    name.clone(),
                    LevelChange {
                        level,
                        delta: level as i64 - previous as i64,
                    },
                )
            })
        })
        .collect()
}

/// Throughput of the tracked statistic between the start and end of a list.
pub fn statistic(
    tracked: &TrackedStat,
    start: &SimulationState,
    end: &SimulationState,
    final_repeats: u64,
) -> StatisticReport {
    let read = |ledger: &Ledger, name: &str| ledger.get(name).copied().unwrap_or(0.0);
    let gained = match tracked {
        TrackedStat::Resource(name) => end.resource(name) - start.resource(name),
        TrackedStat::Skill(name) => read(&end.skills, name) - read(&start.skills, name),
        TrackedStat::Talent(name) => read(&end.talents, name) - read(&start.talents, name),
        TrackedStat::FinalActions => final_repeats as f64,
    };
    let minutes = stats::ticks_to_minutes(end.ticks);
    StatisticReport {
        tracked: tracked.clone(),
        gained,
        per_minute: if minutes > 0.0 { gained / minutes } else { 0.0 },
    }
}

/// Formats game ticks as `HH:MM:SS.f`, with `precision` fractional digits (1 to 10).
pub fn format_ticks(ticks: f64, precision: u32) -> String {
    let precision = precision.clamp(1, 10);
    let seconds = (ticks / stats::stat_constants::TICKS_PER_SECOND).max(0.0);
    let hours = (seconds / 3600.0).floor() as u64;
    let minutes = ((seconds % 3600.0) / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let fraction = ((seconds % 1.0) * 10f64.powi(precision as i32)).floor() as u64;
    format!(
        "{:02}:{:02}:{:02}.{:0width$}",
        hours,
        minutes,
        secs,
        fraction,
        width = precision as usize
    )
}
