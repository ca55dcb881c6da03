//! Action Catalog
//!
//! Definitions of every action the predictor knows how to simulate. A
//! definition is a record of optional capabilities: the engine looks at which
//! ones are present (a loop, a custom base cost, a start condition) and never
//! at what kind of action it is.

use predictor_types::{Ledger, ProgressionState, ScheduledAction, SimulationState};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Decides whether a repeat may start with the given resources.
pub type CanStartFn = Arc<dyn Fn(&Ledger) -> bool + Send + Sync>;

/// Mutates resources and skills when an effect fires.
pub type EffectFn = Arc<dyn Fn(&mut Ledger, &mut Ledger) + Send + Sync>;

/// Replaces the fixed base cost using current resources and skills.
pub type BaseCostFn = Arc<dyn Fn(&Ledger, &Ledger) -> f64 + Send + Sync>;

/// Cost of a segment, given progression so far and the segment index within the repeat.
pub type SegmentCostFn = Arc<dyn Fn(&ProgressionState, &ActionMeta, usize) -> f64 + Send + Sync>;

/// Progress one tick adds, given the segment currently being worked on.
pub type LoopTickFn = Arc<dyn Fn(&mut ProgressionState, &LoopContext<'_>, usize) -> f64 + Send + Sync>;

/// Maximum number of repeats a loop can ever complete.
pub type LoopMaxFn = Arc<dyn Fn(&ActionMeta) -> u64 + Send + Sync>;

/// Static attributes of an action.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionMeta {
    pub name: String,
    /// Budget cost of one repeat before stat discounts.
    pub base_cost: f64,
    /// Experience multiplier. Zero disables experience gain entirely.
    pub exp_mult: f64,
    /// Stat weights, used for both tick cost and experience gain.
    pub stats: BTreeMap<String, f64>,
    /// Segments per repeat of a loop.
    pub segments: usize,
    /// Stats trained by successive segments.
    pub loop_stats: Vec<String>,
    /// Location the action must be performed in, if any.
    pub location: Option<u32>,
    /// The game limits how often this action may be repeated.
    pub repeat_limited: bool,
}

/// Read-only view of the state handed to a loop's tick function.
pub struct LoopContext<'a> {
    pub meta: &'a ActionMeta,
    pub stats: &'a Ledger,
    pub skills: &'a Ledger,
    pub resources: &'a Ledger,
}

impl LoopContext<'_> {
    pub fn skill(&self, name: &str) -> f64 {
        self.skills.get(name).copied().unwrap_or(0.0)
    }

    pub fn resource(&self, name: &str) -> f64 {
        self.resources.get(name).copied().unwrap_or(0.0)
    }
}

/// Repeatable multi-segment progress block.
#[derive(Clone)]
pub struct LoopDefinition {
    pub cost: SegmentCostFn,
    pub tick: LoopTickFn,
    pub max: Option<LoopMaxFn>,
    pub on_segment: Option<EffectFn>,
    pub on_loop: Option<EffectFn>,
    pub on_end: Option<EffectFn>,
}

impl LoopDefinition {
    pub fn new(
        cost: impl Fn(&ProgressionState, &ActionMeta, usize) -> f64 + Send + Sync + 'static,
        tick: impl Fn(&mut ProgressionState, &LoopContext<'_>, usize) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            cost: Arc::new(cost),
            tick: Arc::new(tick),
            max: None,
            on_segment: None,
            on_loop: None,
            on_end: None,
        }
    }

    pub fn max(mut self, max: impl Fn(&ActionMeta) -> u64 + Send + Sync + 'static) -> Self {
        self.max = Some(Arc::new(max));
        self
    }

    /// Fires after every finished segment, including the one that completes a repeat.
    pub fn on_segment(mut self, effect: impl Fn(&mut Ledger, &mut Ledger) + Send + Sync + 'static) -> Self {
        self.on_segment = Some(Arc::new(effect));
        self
    }

    /// Fires when a repeat's last segment finishes.
    pub fn on_loop(mut self, effect: impl Fn(&mut Ledger, &mut Ledger) + Send + Sync + 'static) -> Self {
        self.on_loop = Some(Arc::new(effect));
        self
    }

    /// Fires once per valid repeat, after its budget has been checked.
    pub fn on_end(mut self, effect: impl Fn(&mut Ledger, &mut Ledger) + Send + Sync + 'static) -> Self {
        self.on_end = Some(Arc::new(effect));
        self
    }

    /// Per-segment cost table for the repeat the progression is in.
    pub fn cost_table(&self, progression: &ProgressionState, meta: &ActionMeta) -> Vec<f64> {
        (0..meta.segments)
            .map(|segment| (self.cost)(progression, meta, segment))
            .collect()
    }
}

/// Everything the predictor knows about one action.
#[derive(Clone)]
pub struct ActionDefinition {
    pub meta: ActionMeta,
    /// Resources this action can change; all of them are reported for every entry.
    pub affected: Vec<String>,
    pub can_start: Option<CanStartFn>,
    pub effect: Option<EffectFn>,
    pub base_cost: Option<BaseCostFn>,
    pub looping: Option<LoopDefinition>,
}

impl ActionDefinition {
    /// Creates a flat action with the given base cost and no stats.
    pub fn new(name: impl Into<String>, base_cost: f64) -> Self {
        Self {
            meta: ActionMeta {
                name: name.into(),
                base_cost,
                exp_mult: 1.0,
                stats: BTreeMap::new(),
                segments: 0,
                loop_stats: Vec::new(),
                location: None,
                repeat_limited: false,
            },
            affected: Vec::new(),
            can_start: None,
            effect: None,
            base_cost: None,
            looping: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn stat(mut self, name: impl Into<String>, weight: f64) -> Self {
        self.meta.stats.insert(name.into(), weight);
        self
    }

    pub fn exp_mult(mut self, mult: f64) -> Self {
        self.meta.exp_mult = mult;
        self
    }

    pub fn location(mut self, location: u32) -> Self {
        self.meta.location = Some(location);
        self
    }

    pub fn repeat_limited(mut self) -> Self {
        self.meta.repeat_limited = true;
        self
    }

    pub fn affects<I, S>(mut self, resources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.affected.extend(resources.into_iter().map(Into::into));
        self
    }

    pub fn can_start(mut self, check: impl Fn(&Ledger) -> bool + Send + Sync + 'static) -> Self {
        self.can_start = Some(Arc::new(check));
        self
    }

    pub fn effect(mut self, effect: impl Fn(&mut Ledger, &mut Ledger) + Send + Sync + 'static) -> Self {
        self.effect = Some(Arc::new(effect));
        self
    }

    pub fn base_cost_with(mut self, cost: impl Fn(&Ledger, &Ledger) -> f64 + Send + Sync + 'static) -> Self {
        self.base_cost = Some(Arc::new(cost));
        self
    }

    /// Attaches a loop with `segments` segments training `loop_stats` in turn.
    pub fn with_loop<I, S>(mut self, segments: usize, loop_stats: I, looping: LoopDefinition) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.meta.segments = segments.max(1);
        self.meta.loop_stats = loop_stats.into_iter().map(Into::into).collect();
        self.looping = Some(looping);
        self
    }

    /// Base cost of one repeat under the current resources and skills.
    pub fn resolve_base_cost(&self, resources: &Ledger, skills: &Ledger) -> f64 {
        match &self.base_cost {
            Some(cost) => cost(resources, skills),
            None => self.meta.base_cost,
        }
    }

    /// Segment cap of the loop, if it has one.
    pub fn max_segments(&self) -> Option<u64> {
        let looping = self.looping.as_ref()?;
        let max = looping.max.as_ref()?;
        Some(max(&self.meta).saturating_mul(self.meta.segments as u64))
    }

    /// True once the loop has completed every repeat it ever can.
    pub fn is_capped(&self, progression: Option<&ProgressionState>) -> bool {
        match (self.max_segments(), progression) {
            (Some(max), Some(p)) => p.completed >= max,
            (Some(max), None) => max == 0,
            _ => false,
        }
    }

    /// Whether another repeat may start from this state.
    pub fn can_start_in(&self, state: &SimulationState) -> bool {
        if self.is_capped(state.progress.get(&self.meta.name)) {
            return false;
        }
        match &self.can_start {
            Some(check) => check(&state.resources),
            None => true,
        }
    }

    /// Fires the flat effect and the loop's end effect for one valid repeat.
    pub fn apply_completion(&self, state: &mut SimulationState) {
        if let Some(effect) = &self.effect {
            effect(&mut state.resources, &mut state.skills);
        }
        if let Some(on_end) = self.looping.as_ref().and_then(|l| l.on_end.as_ref()) {
            on_end(&mut state.resources, &mut state.skills);
        }
    }
}

impl fmt::Debug for ActionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDefinition")
            .field("meta", &self.meta)
            .field("affected", &self.affected)
            .field("can_start", &self.can_start.is_some())
            .field("effect", &self.effect.is_some())
            .field("base_cost", &self.base_cost.is_some())
            .field("looping", &self.looping.is_some())
            .finish()
    }
}

/// Name-keyed registry of action definitions.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    actions: BTreeMap<String, ActionDefinition>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a definition, replacing any previous one with the same name.
    pub fn insert(&mut self, action: ActionDefinition) {
        self.actions.insert(action.meta.name.clone(), action);
    }

    pub fn with(mut self, action: ActionDefinition) -> Self {
        self.insert(action);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Sorted union of the resources affected by every known action in the list.
    pub fn affected_resources(&self, actions: &[ScheduledAction]) -> Vec<String> {
        let names: BTreeSet<&str> = actions
            .iter()
            .filter_map(|a| self.get(&a.name))
            .flat_map(|d| d.affected.iter().map(String::as_str))
            .filter(|name| !name.is_empty())
            .collect();
        names.into_iter().map(str::to_string).collect()
    }
}
