//! Stat Experience Model
//!
//! Pure conversions from accumulated experience to levels and multipliers,
//! plus the numeric helpers action formulas are written against.

use std::collections::BTreeMap;

/// Constants shared by the experience formulas.
pub mod stat_constants {
    /// Experience per level step in the triangular level curve.
    pub const EXP_PER_LEVEL_STEP: f64 = 100.0;
    /// Each stat level reduces the tick cost by one part in this many.
    pub const LEVEL_COST_DIVISOR: f64 = 100.0;
    /// Exponent applied to talent level in the experience bonus.
    pub const TALENT_EXPONENT: f64 = 0.4;
    /// Divisor applied to the talent term in the experience bonus.
    pub const TALENT_BONUS_DIVISOR: f64 = 3.0;
    /// Subtracted before rounding tick counts up, so exact products do not gain a tick.
    pub const TICK_ROUNDING_GUARD: f64 = 0.000001;
    /// Game ticks per second of game time.
    pub const TICKS_PER_SECOND: f64 = 50.0;
}

use stat_constants::*;

/// Level reached with `exp` experience on the triangular curve
/// (level `n` needs `50 * n * (n + 1)` experience).
pub fn level_from_exp(exp: f64) -> u64 {
    if exp.is_nan() || exp <= 0.0 {
        return 0;
    }
    (((8.0 * exp / EXP_PER_LEVEL_STEP + 1.0).sqrt() - 1.0) / 2.0).floor() as u64
}

/// Experience needed to reach `level`.
pub fn exp_of_level(level: u64) -> f64 {
    let level = level as f64;
    level * (level + 1.0) * EXP_PER_LEVEL_STEP / 2.0
}

/// Skill levels share the stat curve.
pub fn skill_level(exp: f64) -> u64 {
    level_from_exp(exp)
}

/// Talent levels share the stat curve.
pub fn talent_level(exp: f64) -> u64 {
    level_from_exp(exp)
}

/// Skill bonus for skills that make an action stronger.
pub fn skill_bonus_increasing(exp: f64) -> f64 {
    (1.0 + skill_level(exp) as f64 / 60.0).powf(0.25)
}

/// Skill bonus for skills that make an action cheaper.
pub fn skill_bonus_decreasing(exp: f64) -> f64 {
    1.0 / (1.0 + skill_level(exp) as f64 / 100.0)
}

/// Combined weight of an action's stats, discounted by the player's levels.
///
/// Stats the player has no entry for do not contribute.
pub fn cost_factor(weights: &BTreeMap<String, f64>, stats: &BTreeMap<String, f64>) -> f64 {
    weights
        .iter()
        .filter_map(|(name, weight)| {
            stats
                .get(name)
                .map(|exp| weight / (1.0 + level_from_exp(*exp) as f64 / LEVEL_COST_DIVISOR))
        })
        .sum()
}

/// Number of ticks one repeat takes.
pub fn tick_count(base_cost: f64, factor: f64) -> u64 {
    let ticks = (base_cost * factor - TICK_ROUNDING_GUARD).ceil();
    if ticks.is_finite() && ticks > 0.0 {
        ticks as u64
    } else {
        0
    }
}

/// Experience multiplier for a stat given its soulstone multiplier and talent.
pub fn bonus_multiplier(soulstone_mult: f64, talent_exp: f64) -> f64 {
    soulstone_mult
        * (1.0 + (talent_level(talent_exp) as f64).powf(TALENT_EXPONENT) / TALENT_BONUS_DIVISOR)
}

/// Multiplier from the level of the stat trained in the given loop segment.
pub fn loop_stat_progress(
    loop_stats: &[String],
    stats: &BTreeMap<String, f64>,
    completed: u64,
    offset: usize,
) -> f64 {
    if loop_stats.is_empty() {
        return 1.0;
    }
    let index = ((completed as usize).wrapping_add(offset)) % loop_stats.len();
    let exp = stats.get(&loop_stats[index]).copied().unwrap_or(0.0);
    1.0 + level_from_exp(exp) as f64 / LEVEL_COST_DIVISOR
}

/// Fibonacci sequence starting 1, 1, 2, 3, 5.
pub fn fibonacci(n: u64) -> f64 {
    let (mut a, mut b) = (1.0_f64, 1.0_f64);
    for _ in 0..n {
        let next = a + b;
        a = b;
        b = next;
    }
    a
}

/// Rounds to three significant digits.
pub fn precision3(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let digits = 2 - value.abs().log10().floor() as i32;
    if digits >= 0 {
        let factor = 10f64.powi(digits);
        (value * factor).round() / factor
    } else {
        let factor = 10f64.powi(-digits);
        (value / factor).round() * factor
    }
}

/// Converts game ticks to minutes of game time.
pub fn ticks_to_minutes(ticks: f64) -> f64 {
    ticks / TICKS_PER_SECOND / 60.0
}
