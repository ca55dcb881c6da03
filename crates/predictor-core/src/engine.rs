//! Simulation Engine
//!
//! Advances one action by one repeat, tick by tick. Each tick spends one unit
//! of the budget resource, grants stat experience, and for looping actions
//! pushes progress through the current segment.

use predictor_types::{credit, Ledger, ProgressionState, SimulationState};

use crate::catalog::{ActionDefinition, LoopContext, LoopDefinition};
use crate::stats;
use crate::world::WorldSnapshot;

/// Tick count and base cost of one repeat, fixed when the repeat starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RepeatPlan {
    pub base_cost: f64,
    pub ticks: u64,
}

impl RepeatPlan {
    /// Share of the base cost paid by one tick.
    pub fn progress_scale(&self) -> f64 {
        if self.ticks == 0 {
            0.0
        } else {
            self.base_cost / self.ticks as f64
        }
    }
}

/// What happened during one repeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepeatOutcome {
    /// Ticks the repeat needed.
    pub planned: u64,
    /// Ticks actually paid for.
    pub executed: u64,
    /// The budget ran out before the repeat finished.
    pub exhausted: bool,
}

/// Whether another tick of the same repeat can do anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Stop,
}

/// Steps actions against a world snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SimulationEngine<'w> {
    world: &'w WorldSnapshot,
}

impl<'w> SimulationEngine<'w> {
    pub fn new(world: &'w WorldSnapshot) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &'w WorldSnapshot {
        self.world
    }

    /// Computes the tick count for the next repeat of `action`.
    pub fn plan(&self, action: &ActionDefinition, state: &SimulationState) -> RepeatPlan {
        let base_cost = action.resolve_base_cost(&state.resources, &state.skills);
        let factor = stats::cost_factor(&action.meta.stats, &state.stats);
        RepeatPlan {
            base_cost,
            ticks: stats::tick_count(base_cost, factor),
        }
    }

    /// Runs one repeat of `action`.
    ///
    /// The budget is checked before every tick; a tick that cannot be paid for
    /// ends the repeat as exhausted without being performed.
    pub fn predict(&self, action: &ActionDefinition, state: &mut SimulationState) -> RepeatOutcome {
        let plan = self.plan(action, state);
        let budget = self.world.budget_resource.as_str();
        let mut executed = 0;

        while executed < plan.ticks {
            if state.resource(budget) < 1.0 {
                return RepeatOutcome {
                    planned: plan.ticks,
                    executed,
                    exhausted: true,
                };
            }
            state.add_resource(budget, -1.0);
            executed += 1;
            if self.tick(action, state, &plan) == TickFlow::Stop {
                break;
            }
        }

        RepeatOutcome {
            planned: plan.ticks,
            executed,
            exhausted: false,
        }
    }

    /// Performs a single tick of `action`.
    pub fn tick(&self, action: &ActionDefinition, state: &mut SimulationState, plan: &RepeatPlan) -> TickFlow {
        if action.meta.exp_mult != 0.0 {
            self.gain_experience(action, state, plan);
        }

        let Some(looping) = action.looping.as_ref() else {
            return TickFlow::Continue;
        };

        let name = action.meta.name.as_str();
        let SimulationState {
            resources,
            stats,
            skills,
            progress,
            ..
        } = state;
        if !progress.contains_key(name) {
            progress.insert(
                name.to_string(),
                ProgressionState::with_total(self.world.prior_completions(name)),
            );
        }
        let Some(progression) = progress.get_mut(name) else {
            return TickFlow::Stop;
        };
        let ledgers = LoopLedgers {
            stats,
            skills,
            resources,
        };
        self.advance_loop(action, looping, progression, ledgers, plan)
    }

    fn advance_loop(
        &self,
        action: &ActionDefinition,
        looping: &LoopDefinition,
        progression: &mut ProgressionState,
        mut ledgers: LoopLedgers<'_>,
        plan: &RepeatPlan,
    ) -> TickFlow {
        let meta = &action.meta;
        let segments = meta.segments;
        let max_segments = action.max_segments().unwrap_or(u64::MAX);
        if progression.completed >= max_segments {
            return TickFlow::Stop;
        }

        if progression.cost_list.len() != segments {
            progression.cost_list = looping.cost_table(progression, meta);
        }

        let mut segment = 0;
        let mut progress = progression.progress;
        while segment < segments && progress >= progression.cost_list[segment] {
            progress -= progression.cost_list[segment];
            segment += 1;
        }

        let added = {
            let ctx = LoopContext {
                meta,
                stats: ledgers.stats,
                skills: &*ledgers.skills,
                resources: &*ledgers.resources,
            };
            (looping.tick)(progression, &ctx, segment) * plan.progress_scale()
        };
        progress += added;
        progression.progress += added;

        while segment < segments
            && progress >= progression.cost_list[segment]
            && progression.completed < max_segments
        {
            progress -= progression.cost_list[segment];
            segment += 1;

            if segment >= segments {
                progression.progress = 0.0;
                progression.completed += segments as u64;
                progression.total += 1;
                segment = 0;

                if let Some(on_loop) = &looping.on_loop {
                    on_loop(&mut *ledgers.resources, &mut *ledgers.skills);
                }
                progression.memo.clear();

                if progression.completed < max_segments {
                    progression.progress = progress;
                    progression.cost_list = looping.cost_table(progression, meta);
                }
            }

            if let Some(on_segment) = &looping.on_segment {
                on_segment(&mut *ledgers.resources, &mut *ledgers.skills);
            }
        }

        if added > 0.0 && progression.completed < max_segments {
            TickFlow::Continue
        } else {
            TickFlow::Stop
        }
    }

    /// Grants one tick's worth of experience to every weighted stat and its talent.
    pub(crate) fn gain_experience(&self, action: &ActionDefinition, state: &mut SimulationState, plan: &RepeatPlan) {
        let scale = plan.progress_scale();
        for (stat, weight) in &action.meta.stats {
            let talent = state.talents.get(stat).copied().unwrap_or(0.0);
            let exp = weight * action.meta.exp_mult * scale * self.world.bonus_multiplier(stat, talent);
            credit(&mut state.stats, stat, exp);
            credit(&mut state.talents, stat, exp * self.world.talent_rate);
        }
    }
}

/// Ledgers a loop reads and its effects write, borrowed apart from the progression.
struct LoopLedgers<'a> {
    stats: &'a Ledger,
    skills: &'a mut Ledger,
    resources: &'a mut Ledger,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::LoopDefinition;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn world() -> WorldSnapshot {
        WorldSnapshot::default()
    }

    #[test]
    fn test_plan_uses_stat_weights() {
        let world = world();
        let engine = SimulationEngine::new(&world);
        let action = ActionDefinition::new("Wander", 250.0).stat("Per", 0.2).stat("Con", 0.2);
        let state = SimulationState::new().with_stat("Per", 0.0).with_stat("Con", 0.0);
        let plan = engine.plan(&action, &state);
        assert_eq!(plan.ticks, 100);
        assert_eq!(plan.progress_scale(), 2.5);
    }

    #[test]
    fn test_predict_spends_budget_per_tick() {
        let world = world();
        let engine = SimulationEngine::new(&world);
        let action = ActionDefinition::new("Wander", 100.0).stat("Per", 1.0);
        let mut state = SimulationState::new().with_resource("mana", 250.0).with_stat("Per", 0.0);

        let outcome = engine.predict(&action, &mut state);
        assert_eq!(outcome.executed, 100);
        assert!(!outcome.exhausted);
        assert_eq!(state.resource("mana"), 150.0);
        // Experience equals the base cost for a unit weight at no bonus
        assert!((state.stats["Per"] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_predict_exhausts_budget() {
        let world = world();
        let engine = SimulationEngine::new(&world);
        let action = ActionDefinition::new("Long Walk", 300.0).stat("Con", 1.0);
        let mut state = SimulationState::new().with_resource("mana", 250.0).with_stat("Con", 0.0);

        let outcome = engine.predict(&action, &mut state);
        assert!(outcome.exhausted);
        assert_eq!(outcome.planned, 300);
        assert_eq!(outcome.executed, 250);
        assert_eq!(state.resource("mana"), 0.0);
    }

    #[test]
    fn test_zero_exp_mult_grants_nothing() {
        let world = world();
        let engine = SimulationEngine::new(&world);
        let action = ActionDefinition::new("Restore", 10.0).stat("Int", 1.0).exp_mult(0.0);
        let mut state = SimulationState::new().with_resource("mana", 100.0).with_stat("Int", 0.0);
        engine.predict(&action, &mut state);
        assert_eq!(state.stats["Int"], 0.0);
        assert_eq!(state.resource("mana"), 90.0);
    }

    #[test]
    fn test_talent_gain_from_experience() {
        let world = WorldSnapshot::default().with_talent_rate(0.05);
        let engine = SimulationEngine::new(&world);
        let action = ActionDefinition::new("Study", 1000.0).stat("Int", 1.0);
        let mut state = SimulationState::new().with_stat("Int", 0.0);
        let plan = RepeatPlan {
            base_cost: 1000.0,
            ticks: 1,
        };
        engine.gain_experience(&action, &mut state, &plan);
        assert!((state.stats["Int"] - 1000.0).abs() < 1e-9);
        assert!((state.talents["Int"] - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_rollover_fires_effects() {
        let world = world();
        let engine = SimulationEngine::new(&world);
        let segments = Arc::new(AtomicUsize::new(0));
        let loops = Arc::new(AtomicUsize::new(0));
        let (s, l) = (segments.clone(), loops.clone());
        let costs = [100.0, 150.0, 250.0];
        let action = ActionDefinition::new("Trial", 10.0).stat("Str", 1.0).with_loop(
            3,
            ["Str"],
            LoopDefinition::new(move |_, _, segment| costs[segment], |_, _, _| 5.0)
                .on_segment(move |_, _| {
                    s.fetch_add(1, Ordering::SeqCst);
                })
                .on_loop(move |_, _| {
                    l.fetch_add(1, Ordering::SeqCst);
                }),
        );
        let mut state = SimulationState::new().with_resource("mana", 1000.0).with_stat("Str", 0.0);
        let plan = RepeatPlan {
            base_cost: 10.0,
            ticks: 1,
        };

        // Each tick contributes 5 * 10 = 50 progress
        for _ in 0..10 {
            engine.tick(&action, &mut state, &plan);
        }
        assert_eq!(loops.load(Ordering::SeqCst), 1);
        assert_eq!(segments.load(Ordering::SeqCst), 3);
        let progression = &state.progress["Trial"];
        assert_eq!(progression.completed, 3);
        assert_eq!(progression.total, 1);
        assert_eq!(progression.progress, 0.0);
    }

    #[test]
    fn test_leftover_progress_carries_over() {
        let world = world();
        let engine = SimulationEngine::new(&world);
        let action = ActionDefinition::new("Fight", 1.0).with_loop(
            2,
            ["Str", "Dex"],
            LoopDefinition::new(|_, _, _| 40.0, |_, _, _| 50.0),
        );
        let mut state = SimulationState::new();
        let plan = RepeatPlan {
            base_cost: 1.0,
            ticks: 1,
        };
        engine.tick(&action, &mut state, &plan);
        engine.tick(&action, &mut state, &plan);
        let progression = &state.progress["Fight"];
        assert_eq!(progression.completed, 2);
        assert_eq!(progression.total, 1);
        assert!((progression.progress - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_capped_loop_stops_ticking() {
        let world = world().with_prior_completions("Dungeon", 4);
        let engine = SimulationEngine::new(&world);
        let action = ActionDefinition::new("Dungeon", 1.0).with_loop(
            1,
            ["Str"],
            LoopDefinition::new(|_, _, _| 10.0, |_, _, _| 10.0).max(|_| 2),
        );
        let mut state = SimulationState::new();
        let plan = RepeatPlan {
            base_cost: 1.0,
            ticks: 1,
        };
        assert_eq!(engine.tick(&action, &mut state, &plan), TickFlow::Continue);
        assert_eq!(engine.tick(&action, &mut state, &plan), TickFlow::Stop);
        assert_eq!(engine.tick(&action, &mut state, &plan), TickFlow::Stop);

        let progression = &state.progress["Dungeon"];
        assert_eq!(progression.completed, 2);
        assert_eq!(progression.total, 6);
        assert_eq!(progression.progress, 0.0);
        assert!(action.is_capped(Some(progression)));
    }

    #[test]
    fn test_memo_cleared_on_wrap() {
        let world = world();
        let engine = SimulationEngine::new(&world);
        let action = ActionDefinition::new("Hunt", 1.0).with_loop(
            1,
            ["Str"],
            LoopDefinition::new(|_, _, _| 10.0, |p, _, _| {
                let completed = p.completed as f64;
                p.memoize("speed", || 5.0 + completed)
            }),
        );
        let mut state = SimulationState::new();
        let plan = RepeatPlan {
            base_cost: 1.0,
            ticks: 1,
        };
        engine.tick(&action, &mut state, &plan);
        assert_eq!(state.progress["Hunt"].memo.get("speed"), Some(&5.0));
        engine.tick(&action, &mut state, &plan);
        assert!(state.progress["Hunt"].memo.is_empty());
        engine.tick(&action, &mut state, &plan);
        assert_eq!(state.progress["Hunt"].memo.get("speed"), Some(&6.0));
    }
}
