//! Sample Catalog
//!
//! A handful of first-location actions covering every capability the engine
//! dispatches on: flat effects, start conditions, base cost overrides,
//! Fibonacci and geometric loop costs, and a capped dungeon.

use predictor_types::Ledger;

use crate::catalog::{ActionDefinition, Catalog, LoopContext, LoopDefinition};
use crate::stats::{self, fibonacci, loop_stat_progress, precision3, skill_level};

/// Pots that still hold mana in a fresh loop.
pub const GOOD_POTS: f64 = 10.0;
/// Mana released by a good pot.
pub const POT_MANA: f64 = 100.0;
/// Locks that still hold gold in a fresh loop.
pub const GOOD_LOCKS: f64 = 5.0;
/// Gold behind a good lock.
pub const LOCK_GOLD: f64 = 10.0;
/// Mana bought per gold.
pub const MANA_PER_GOLD: f64 = 50.0;
/// Floors of the small dungeon.
pub const SMALL_DUNGEON_FLOORS: u64 = 7;

const SEGMENT_GUARD: f64 = 0.0000001;

fn get(ledger: &Ledger, name: &str) -> f64 {
    ledger.get(name).copied().unwrap_or(0.0)
}

fn add(ledger: &mut Ledger, name: &str, amount: f64) {
    *ledger.entry(name.to_string()).or_insert(0.0) += amount;
}

/// Combat strength of the player alone.
fn self_combat(ctx: &LoopContext<'_>) -> f64 {
    skill_level(ctx.skill("combat")) as f64
}

/// Repeats into the loop, as used by the cost curves.
fn loop_floor(completed: u64, segment: usize, segments: usize) -> f64 {
    ((completed + segment as u64) as f64 / segments as f64 + SEGMENT_GUARD).floor()
}

fn heal_the_sick() -> ActionDefinition {
    let looping = LoopDefinition::new(
        |p, meta, segment| fibonacci(2 + loop_floor(p.completed, segment, meta.segments) as u64) * 5000.0,
        |p, ctx, offset| {
            let magic = skill_level(ctx.skill("magic")) as f64;
            let restoration = skill_level(ctx.skill("restoration")) as f64;
            magic
                * (restoration / 50.0).max(1.0)
                * loop_stat_progress(&ctx.meta.loop_stats, ctx.stats, p.completed, offset)
                * (1.0 + p.total as f64 / 100.0).sqrt()
        },
    )
    .on_loop(|r, _| add(r, "rep", 3.0))
    .on_end(|_, k| add(k, "magic", 10.0));

    ActionDefinition::new("Heal The Sick", 2500.0)
        .stat("Per", 0.2)
        .stat("Int", 0.2)
        .stat("Cha", 0.2)
        .stat("Soul", 0.4)
        .location(0)
        .affects(["rep"])
        .can_start(|r| get(r, "rep") >= 1.0)
        .with_loop(3, ["Per", "Int", "Cha"], looping)
}

fn fight_monsters() -> ActionDefinition {
    let looping = LoopDefinition::new(
        |p, meta, segment| {
            let index = (p.completed + segment as u64) as f64 - p.completed as f64 / meta.segments as f64;
            fibonacci((index + SEGMENT_GUARD).floor().max(0.0) as u64) * 10000.0
        },
        |p, ctx, offset| {
            let combat = p.memoize("self_combat", || self_combat(ctx));
            combat
                * (1.0 + p.total as f64 / 100.0).sqrt()
                * loop_stat_progress(&ctx.meta.loop_stats, ctx.stats, p.completed, offset)
        },
    )
    .on_segment(|r, _| add(r, "gold", 20.0))
    .on_end(|_, k| add(k, "combat", 10.0));

    ActionDefinition::new("Fight Monsters", 2000.0)
        .stat("Str", 0.3)
        .stat("Spd", 0.3)
        .stat("Con", 0.3)
        .stat("Luck", 0.1)
        .location(0)
        .affects(["gold"])
        .can_start(|r| get(r, "rep") >= 2.0)
        .with_loop(
            3,
            ["Spd", "Spd", "Spd", "Str", "Str", "Str", "Con", "Con", "Con"],
            looping,
        )
}

fn small_dungeon() -> ActionDefinition {
    let looping = LoopDefinition::new(
        |p, meta, segment| precision3(2f64.powf(loop_floor(p.completed, segment, meta.segments)) * 15000.0),
        |p, ctx, offset| {
            let floor = p.repeats_completed(ctx.meta.segments);
            if floor >= SMALL_DUNGEON_FLOORS {
                return 0.0;
            }
            (self_combat(ctx) + skill_level(ctx.skill("magic")) as f64)
                * loop_stat_progress(&ctx.meta.loop_stats, ctx.stats, p.completed, offset)
                * (1.0 + p.total as f64 / 200.0).sqrt()
        },
    )
    .max(|_| SMALL_DUNGEON_FLOORS)
    .on_loop(|r, _| add(r, "soul", 1.0))
    .on_end(|_, k| {
        add(k, "combat", 5.0);
        add(k, "magic", 5.0);
    });

    ActionDefinition::new("Small Dungeon", 2000.0)
        .stat("Str", 0.1)
        .stat("Dex", 0.4)
        .stat("Con", 0.3)
        .stat("Cha", 0.1)
        .stat("Luck", 0.1)
        .location(0)
        .affects(["soul"])
        .can_start(|r| get(r, "rep") >= 2.0)
        .with_loop(
            7,
            ["Dex", "Con", "Dex", "Cha", "Dex", "Str", "Luck"],
            looping,
        )
}

/// Builds the sample catalog.
pub fn sample_catalog() -> Catalog {
    Catalog::new()
        .with(
            ActionDefinition::new("Wander", 250.0)
                .stat("Per", 0.2)
                .stat("Con", 0.2)
                .stat("Cha", 0.2)
                .stat("Spd", 0.3)
                .stat("Luck", 0.1)
                .location(0),
        )
        .with(
            ActionDefinition::new("Smash Pots", 50.0)
                .stat("Str", 0.2)
                .stat("Spd", 0.6)
                .stat("Con", 0.2)
                .location(0)
                .affects(["mana"])
                .effect(|r, _| {
                    add(r, "pots_smashed", 1.0);
                    if get(r, "pots_smashed") <= GOOD_POTS {
                        add(r, "mana", POT_MANA);
                    }
                }),
        )
        .with(
            ActionDefinition::new("Pick Locks", 400.0)
                .stat("Dex", 0.5)
                .stat("Per", 0.3)
                .stat("Spd", 0.1)
                .stat("Luck", 0.1)
                .location(0)
                .affects(["gold"])
                .effect(|r, _| {
                    add(r, "locks_picked", 1.0);
                    if get(r, "locks_picked") <= GOOD_LOCKS {
                        add(r, "gold", LOCK_GOLD);
                    }
                }),
        )
        .with(
            ActionDefinition::new("Buy Glasses", 50.0)
                .stat("Cha", 0.7)
                .stat("Spd", 0.3)
                .location(0)
                .repeat_limited()
                .affects(["gold", "glasses"])
                .can_start(|r| get(r, "gold") >= 10.0 && get(r, "glasses") < 1.0)
                .effect(|r, _| {
                    add(r, "gold", -10.0);
                    r.insert("glasses".to_string(), 1.0);
                }),
        )
        .with(
            ActionDefinition::new("Buy Mana", 100.0)
                .stat("Cha", 0.7)
                .stat("Int", 0.2)
                .stat("Luck", 0.1)
                .location(0)
                .affects(["mana", "gold"])
                .effect(|r, _| {
                    let gold = get(r, "gold");
                    add(r, "mana", gold * MANA_PER_GOLD);
                    r.insert("gold".to_string(), 0.0);
                }),
        )
        .with(
            ActionDefinition::new("Meet People", 800.0)
                .stat("Int", 0.1)
                .stat("Cha", 0.8)
                .stat("Soul", 0.1)
                .location(0),
        )
        .with(
            ActionDefinition::new("Train Strength", 2000.0)
                .stat("Str", 0.8)
                .stat("Con", 0.2)
                .exp_mult(4.0)
                .location(0),
        )
        .with(
            ActionDefinition::new("Throw Party", 1600.0)
                .stat("Cha", 0.8)
                .stat("Soul", 0.2)
                .location(0)
                .affects(["rep"])
                .can_start(|r| get(r, "rep") >= 2.0)
                .effect(|r, _| add(r, "rep", -2.0)),
        )
        .with(
            ActionDefinition::new("Warrior Lessons", 1000.0)
                .stat("Str", 0.5)
                .stat("Dex", 0.3)
                .stat("Con", 0.2)
                .location(0)
                .can_start(|r| get(r, "rep") >= 2.0)
                .effect(|_, k| add(k, "combat", 100.0)),
        )
        .with(
            ActionDefinition::new("Mage Lessons", 1000.0)
                .stat("Int", 0.5)
                .stat("Cha", 0.3)
                .stat("Soul", 0.2)
                .location(0)
                .can_start(|r| get(r, "rep") >= 2.0)
                .base_cost_with(|_, k| 1000.0 * stats::skill_bonus_decreasing(get(k, "magic")))
                .effect(|_, k| add(k, "magic", 100.0)),
        )
        .with(heal_the_sick())
        .with(fight_monsters())
        .with(small_dungeon())
}
