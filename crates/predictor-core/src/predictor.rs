//! Prediction Pass
//!
//! Walks the action list in order, simulating each entry on a running state
//! and reusing the cached prefix recorded by earlier passes. Only the entries
//! after the first changed one are simulated again.

use predictor_types::{
    final_active_index, EntryOutcome, EntryReport, PredictionReport, ProgressionState, ScheduledAction,
    SimulationState,
};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{tail_is_stale, tail_snapshot_index, CacheData, CacheKey, Checkpoint, PredictionCache};
use crate::catalog::{ActionDefinition, Catalog};
use crate::config::PredictorConfig;
use crate::engine::SimulationEngine;
use crate::pass::{NoYield, PassControl, PassHandle, PassMetrics, PassOutcome, PassProgress, PassToken, YieldHook};
use crate::refresh::SlowRefresh;
use crate::report;
use crate::world::WorldSnapshot;

/// Result of simulating one entry.
struct EntryRun {
    valid: bool,
    repeats: u64,
}

/// Owns the cache and pass generation for one action list view.
pub struct Predictor {
    catalog: Catalog,
    config: PredictorConfig,
    cache: PredictionCache,
    control: PassControl,
    refresh: SlowRefresh,
}

impl Predictor {
    pub fn new(catalog: Catalog, config: PredictorConfig) -> Self {
        Self {
            cache: PredictionCache::new(config.cache.enabled),
            refresh: SlowRefresh::from_config(&config.refresh),
            control: PassControl::new(),
            catalog,
            config,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    pub fn cache(&self) -> &PredictionCache {
        &self.cache
    }

    /// Handle for superseding a running pass.
    pub fn pass_handle(&self) -> PassHandle {
        self.control.handle()
    }

    /// Seed for a pass starting at `now`, honouring slow refresh.
    pub fn seed_state(&mut self, now: Instant, fresh: impl FnOnce() -> SimulationState) -> SimulationState {
        self.refresh.resolve(now, fresh)
    }

    /// Runs a pass without yielding.
    pub fn run(&mut self, actions: &[ScheduledAction], seed: SimulationState, world: &WorldSnapshot) -> PassOutcome {
        self.predict(actions, seed, world, &mut NoYield)
    }

    /// Runs a pass, calling `hook` every `yield_every_repeats` simulated repeats.
    ///
    /// Returns [`PassOutcome::Superseded`] if a newer pass starts while this one
    /// is yielded.
    pub fn predict<H: YieldHook>(
        &mut self,
        actions: &[ScheduledAction],
        seed: SimulationState,
        world: &WorldSnapshot,
        hook: &mut H,
    ) -> PassOutcome {
        let token = self.control.begin();
        let mut metrics = PassMetrics::default();
        let affected = self.catalog.affected_resources(actions);

        let seed_data = CacheData::Seed {
            state: seed.clone(),
            affected: affected.clone(),
            world: world.clone(),
        };
        let mut cache_live = self.cache.reset(&seed_data);
        metrics.cache_reused = cache_live;

        let mut state = seed;
        state.ensure_resources(affected.iter().map(String::as_str));
        let start = state.clone();

        let final_index = final_active_index(actions).unwrap_or(0);
        let engine = SimulationEngine::new(world);
        let mut total = 0.0;
        let mut final_repeats = 0;
        let mut since_yield = 0;
        let mut entries = Vec::with_capacity(actions.len());

        for (index, scheduled) in actions.iter().enumerate() {
            let before = state.clone();
            let entry_key = CacheKey::Entry {
                name: scheduled.name.clone(),
                repeats: scheduled.repeats,
                disabled: scheduled.disabled,
            };

            if cache_live && index < final_index {
                match self.cache.next(&entry_key) {
                    Some(CacheData::Entry(checkpoint)) => {
                        debug!(index, name = %scheduled.name, "cache hit");
                        metrics.cache_hits += 1;
                        state = checkpoint.state;
                        total = checkpoint.total;
                        let outcome = match self.catalog.get(&scheduled.name) {
                            Some(_) => EntryOutcome::Predicted(report::entry_prediction(
                                &before,
                                &state,
                                &affected,
                                checkpoint.valid,
                                checkpoint.repeats,
                            )),
                            None => EntryOutcome::NoPrediction,
                        };
                        entries.push(EntryReport {
                            index,
                            name: scheduled.name.clone(),
                            outcome,
                        });
                        continue;
                    }
                    Some(_) => {
                        self.cache.miss(true);
                        cache_live = false;
                    }
                    None => {
                        debug!(index, name = %scheduled.name, "cache miss");
                        cache_live = false;
                    }
                }
            }

            let Some(action) = self.catalog.get(&scheduled.name) else {
                debug!(index, name = %scheduled.name, "no prediction for unknown action");
                if index < final_index {
                    self.cache.add(
                        entry_key,
                        CacheData::Entry(Checkpoint {
                            state: state.clone(),
                            total,
                            valid: false,
                            repeats: 0,
                        }),
                    );
                }
                entries.push(EntryReport {
                    index,
                    name: scheduled.name.clone(),
                    outcome: EntryOutcome::NoPrediction,
                });
                continue;
            };

            let run = {
                let mut ctx = EntryContext {
                    cache: &mut self.cache,
                    control: &self.control,
                    config: &self.config,
                    engine: &engine,
                    token,
                    metrics: &mut metrics,
                    since_yield: &mut since_yield,
                };
                let is_final = index == final_index;
                ctx.simulate(index, is_final, cache_live && is_final, scheduled, action, &mut state, &mut total, hook)
            };
            let Some(run) = run else {
                info!(index, "prediction pass superseded");
                return PassOutcome::Superseded;
            };

            if index == final_index {
                final_repeats = run.repeats;
                cache_live = false;
            } else if index < final_index {
                self.cache.add(
                    entry_key,
                    CacheData::Entry(Checkpoint {
                        state: state.clone(),
                        total,
                        valid: run.valid,
                        repeats: run.repeats,
                    }),
                );
            }

            entries.push(EntryReport {
                index,
                name: scheduled.name.clone(),
                outcome: EntryOutcome::Predicted(report::entry_prediction(
                    &before,
                    &state,
                    &affected,
                    run.valid,
                    run.repeats,
                )),
            });
        }

        let statistic = report::statistic(&self.config.prediction.tracked, &start, &state, final_repeats);
        info!(
            entries = entries.len(),
            total_spent = total,
            cache_hits = metrics.cache_hits,
            simulated_repeats = metrics.simulated_repeats,
            "prediction pass complete"
        );

        PassOutcome::Completed {
            report: PredictionReport {
                entries,
                total_spent: total,
                total_ticks: state.ticks,
                statistic,
            },
            metrics,
        }
    }
}

/// Borrowed pieces of the predictor used while one entry is simulated.
struct EntryContext<'a, 'w> {
    cache: &'a mut PredictionCache,
    control: &'a PassControl,
    config: &'a PredictorConfig,
    engine: &'a SimulationEngine<'w>,
    token: PassToken,
    metrics: &'a mut PassMetrics,
    since_yield: &'a mut u64,
}

impl EntryContext<'_, '_> {
    /// Simulates the repeats of one known entry.
    ///
    /// Returns `None` when the pass was superseded at a yield point.
    #[allow(clippy::too_many_arguments)]
    fn simulate<H: YieldHook>(
        &mut self,
        index: usize,
        is_final: bool,
        tail_probe: bool,
        scheduled: &ScheduledAction,
        action: &ActionDefinition,
        state: &mut SimulationState,
        total: &mut f64,
        hook: &mut H,
    ) -> Option<EntryRun> {
        let world = self.engine.world();
        let prediction = &self.config.prediction;
        let name = action.name();
        // Repeat mode runs the final entry until it fails, so no tail snapshot applies
        let repeat_mode = prediction.repeat_last_action && is_final && !action.meta.repeat_limited;
        let record_tail = is_final && !repeat_mode;

        let mut valid = match action.meta.location {
            Some(location) => state.resource(&world.location_resource) == f64::from(location),
            None => true,
        };
        if action.looping.is_some() && !state.progress.contains_key(name) {
            state
                .progress
                .insert(name.to_string(), ProgressionState::with_total(world.prior_completions(name)));
        }

        let tail_key = CacheKey::Tail {
            name: scheduled.name.clone(),
            disabled: scheduled.disabled,
        };
        let mut repeat = 0;
        if tail_probe && record_tail {
            match self.cache.next(&tail_key) {
                Some(CacheData::Tail {
                    checkpoint,
                    repeats_done,
                }) if repeats_done <= scheduled.repeats => {
                    debug!(index, repeats_done, "resuming final entry from tail snapshot");
                    *state = checkpoint.state;
                    *total = checkpoint.total;
                    valid = checkpoint.valid;
                    repeat = repeats_done;
                    self.metrics.tail_resumed_at = Some(repeats_done);
                    if tail_is_stale(repeats_done, scheduled.repeats) {
                        self.cache.miss(true);
                    }
                }
                Some(_) => self.cache.miss(true),
                None => {}
            }
        }
        let tail_index = tail_snapshot_index(scheduled.repeats);

        let budget = world.budget_resource.as_str();
        let yield_every = prediction.yield_every_repeats.max(1);

        while valid && !scheduled.disabled {
            if repeat_mode {
                if repeat >= prediction.repeat_limit {
                    warn!(name, limit = prediction.repeat_limit, "repeat limit reached");
                    break;
                }
            } else if repeat >= scheduled.repeats {
                break;
            }
            if !action.can_start_in(state) {
                valid = false;
                break;
            }

            let budget_before = state.resource(budget);
            let outcome = self.engine.predict(action, state);
            if outcome.exhausted {
                valid = false;
            }
            let spent = budget_before - state.resource(budget);
            *total += spent;
            state.ticks += spent / world.speed_multiplier(state.resource(&world.location_resource));
            self.metrics.simulated_repeats += 1;

            if !valid {
                break;
            }
            action.apply_completion(state);

            if record_tail && repeat == tail_index {
                self.cache.add(
                    tail_key.clone(),
                    CacheData::Tail {
                        checkpoint: Checkpoint {
                            state: state.clone(),
                            total: *total,
                            valid,
                            repeats: repeat + 1,
                        },
                        repeats_done: repeat + 1,
                    },
                );
            }
            repeat += 1;

            *self.since_yield += 1;
            if *self.since_yield >= yield_every {
                *self.since_yield = 0;
                hook.on_yield(PassProgress {
                    entry: index,
                    repeats: self.metrics.simulated_repeats,
                });
                if !self.control.is_current(self.token) {
                    return None;
                }
            }
        }

        if repeat_mode {
            valid = repeat >= scheduled.repeats;
        }

        if action.meta.segments > 0 {
            if let Some(progression) = state.progress.get(name) {
                let value = progression.completed as f64 / action.meta.segments as f64;
                state.curr_progress.insert(name.to_string(), value);
            }
        }

        Some(EntryRun { valid, repeats: repeat })
    }
}
