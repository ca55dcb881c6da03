//! Incremental cache integration tests
//!
//! Prefix reuse after an edit, and the tail snapshot of the final entry.

use predictor_core::{
    ActionDefinition, CacheKey, Catalog, PassMetrics, PassOutcome, Predictor, PredictorConfig, WorldSnapshot,
};
use predictor_types::{PredictionReport, ScheduledAction, SimulationState};

/// Flat action whose repeats always take `ticks` ticks.
fn flat(name: &str, ticks: f64) -> ActionDefinition {
    ActionDefinition::new(name, ticks).stat("Str", 1.0).exp_mult(0.0)
}

fn catalog() -> Catalog {
    Catalog::new()
        .with(flat("Walk", 10.0))
        .with(flat("Jog", 20.0))
        .with(flat("Run", 5.0).affects(["distance"]).effect(|r, _| {
            *r.entry("distance".to_string()).or_insert(0.0) += 1.0;
        }))
}

fn seed() -> SimulationState {
    SimulationState::new()
        .with_resource("mana", 100_000.0)
        .with_resource("town", 0.0)
        .with_stat("Str", 0.0)
}

fn list(entries: &[(&str, u64)]) -> Vec<ScheduledAction> {
    entries
        .iter()
        .map(|(name, repeats)| ScheduledAction::new(*name, *repeats))
        .collect()
}

fn completed(outcome: PassOutcome) -> (PredictionReport, PassMetrics) {
    match outcome {
        PassOutcome::Completed { report, metrics } => (report, metrics),
        PassOutcome::Superseded => panic!("pass should complete"),
    }
}

fn cold(actions: &[ScheduledAction]) -> PredictionReport {
    let mut predictor = Predictor::new(catalog(), PredictorConfig::default());
    completed(predictor.run(actions, seed(), &WorldSnapshot::default())).0
}

/// Test that editing the last entry reuses every earlier entry untouched
#[test]
fn test_prefix_reuse_after_editing_last_entry() {
    let world = WorldSnapshot::default();
    let mut predictor = Predictor::new(catalog(), PredictorConfig::default());

    let first = list(&[("Walk", 2), ("Jog", 3), ("Run", 4)]);
    let (_, metrics) = completed(predictor.run(&first, seed(), &world));
    assert_eq!(metrics.cache_hits, 0);
    let keys_before: Vec<CacheKey> = predictor.cache().keys().cloned().collect();
    assert_eq!(keys_before.len(), 3);

    let edited = list(&[("Walk", 2), ("Jog", 3), ("Run", 5)]);
    let (report, metrics) = completed(predictor.run(&edited, seed(), &world));

    assert_eq!(metrics.cache_hits, 2);
    // The tail snapshot after repeat 4 covers all but the last repeat
    assert_eq!(metrics.tail_resumed_at, Some(4));
    assert_eq!(metrics.simulated_repeats, 1);

    let keys_after: Vec<CacheKey> = predictor.cache().keys().cloned().collect();
    assert_eq!(keys_after[..2], keys_before[..2]);
    assert_eq!(report, cold(&edited));
}

/// Test that editing a middle entry resimulates from that entry on
#[test]
fn test_edit_in_middle_truncates_cache() {
    let world = WorldSnapshot::default();
    let mut predictor = Predictor::new(catalog(), PredictorConfig::default());

    predictor.run(&list(&[("Walk", 2), ("Jog", 3), ("Run", 4)]), seed(), &world);
    let edited = list(&[("Walk", 2), ("Jog", 1), ("Run", 4)]);
    let (report, metrics) = completed(predictor.run(&edited, seed(), &world));

    assert_eq!(metrics.cache_hits, 1);
    assert_eq!(metrics.tail_resumed_at, None);
    assert_eq!(metrics.simulated_repeats, 1 + 4);
    assert_eq!(report, cold(&edited));
}

/// Test that the tail snapshot resumes a shortened final entry near its end
#[test]
fn test_tail_snapshot_resumes_final_entry() {
    let world = WorldSnapshot::default();
    let mut predictor = Predictor::new(catalog(), PredictorConfig::default());

    predictor.run(&list(&[("Walk", 1), ("Run", 100)]), seed(), &world);

    let shorter = list(&[("Walk", 1), ("Run", 95)]);
    let (report, metrics) = completed(predictor.run(&shorter, seed(), &world));
    assert_eq!(metrics.tail_resumed_at, Some(91));
    assert_eq!(metrics.simulated_repeats, 4);
    assert_eq!(report, cold(&shorter));

    let longer = list(&[("Walk", 1), ("Run", 120)]);
    let (report, metrics) = completed(predictor.run(&longer, seed(), &world));
    // The old snapshot sits before the new 90% point, so it is recorded again
    assert_eq!(metrics.tail_resumed_at, Some(91));
    assert_eq!(metrics.simulated_repeats, 29);
    assert_eq!(report, cold(&longer));

    let (_, metrics) = completed(predictor.run(&longer, seed(), &world));
    assert_eq!(metrics.tail_resumed_at, Some(109));
    assert_eq!(metrics.simulated_repeats, 11);
}

/// Test that a final entry shorter than the snapshot resimulates from repeat 0
#[test]
fn test_tail_snapshot_discarded_when_count_drops() {
    let world = WorldSnapshot::default();
    let mut predictor = Predictor::new(catalog(), PredictorConfig::default());

    predictor.run(&list(&[("Walk", 1), ("Run", 100)]), seed(), &world);

    let much_shorter = list(&[("Walk", 1), ("Run", 50)]);
    let (report, metrics) = completed(predictor.run(&much_shorter, seed(), &world));
    assert_eq!(metrics.cache_hits, 1);
    assert_eq!(metrics.tail_resumed_at, None);
    assert_eq!(metrics.simulated_repeats, 50);
    assert_eq!(report, cold(&much_shorter));

    let (_, metrics) = completed(predictor.run(&much_shorter, seed(), &world));
    assert_eq!(metrics.tail_resumed_at, Some(46));
    assert_eq!(metrics.simulated_repeats, 4);
}

/// Test that unknown names keep the cached prefix aligned
#[test]
fn test_unknown_action_is_cached_in_place() {
    let world = WorldSnapshot::default();
    let mut predictor = Predictor::new(catalog(), PredictorConfig::default());
    let actions = list(&[("Walk", 1), ("Mystery", 3), ("Jog", 1), ("Run", 2)]);

    let (first, _) = completed(predictor.run(&actions, seed(), &world));
    assert!(first.entries[1].outcome.prediction().is_none());

    let (second, metrics) = completed(predictor.run(&actions, seed(), &world));
    assert_eq!(metrics.cache_hits, 3);
    assert_eq!(first, second);
}

/// Test that repeat mode never resumes from a tail snapshot
#[test]
fn test_repeat_mode_disables_tail_snapshot() {
    let world = WorldSnapshot::default();
    let mut config = PredictorConfig::default();
    config.prediction.repeat_last_action = true;
    config.prediction.repeat_limit = 50;
    let mut predictor = Predictor::new(catalog(), config);
    let actions = list(&[("Walk", 1), ("Run", 20)]);

    predictor.run(&actions, seed(), &world);
    let (report, metrics) = completed(predictor.run(&actions, seed(), &world));

    assert_eq!(metrics.cache_hits, 1);
    assert_eq!(metrics.tail_resumed_at, None);
    assert_eq!(metrics.simulated_repeats, 50);
    assert_eq!(report.entries[1].outcome.prediction().map(|p| p.repeats), Some(50));
    assert!(!predictor
        .cache()
        .keys()
        .any(|k| matches!(k, CacheKey::Tail { .. })));
}
