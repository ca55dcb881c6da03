//! Pass Control
//!
//! Each prediction pass takes a token from a shared generation counter. Any
//! holder of a [`PassHandle`] can start a newer generation; the running pass
//! notices at its next yield point and stops without publishing a report.

use predictor_types::PredictionReport;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Identifies one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassToken(u64);

/// Hands out pass tokens.
#[derive(Debug, Clone, Default)]
pub struct PassControl {
    generation: Arc<AtomicU64>,
}

impl PassControl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new pass, superseding any pass still running.
    pub fn begin(&self) -> PassToken {
        PassToken(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True while no newer pass has started since `token` was issued.
    pub fn is_current(&self, token: PassToken) -> bool {
        self.generation.load(Ordering::SeqCst) == token.0
    }

    /// Handle the host keeps to supersede passes from outside the predictor.
    pub fn handle(&self) -> PassHandle {
        PassHandle {
            generation: Arc::clone(&self.generation),
        }
    }
}

/// Host-side handle onto a predictor's pass generation.
#[derive(Debug, Clone)]
pub struct PassHandle {
    generation: Arc<AtomicU64>,
}

impl PassHandle {
    /// Marks the running pass as stale.
    pub fn supersede(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Where a pass stands when it yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassProgress {
    /// Index of the entry being simulated.
    pub entry: usize,
    /// Repeats simulated so far in this pass.
    pub repeats: u64,
}

/// Called periodically while a pass runs.
pub trait YieldHook {
    fn on_yield(&mut self, progress: PassProgress);
}

impl<F: FnMut(PassProgress)> YieldHook for F {
    fn on_yield(&mut self, progress: PassProgress) {
        self(progress)
    }
}

/// Hook that never does anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoYield;

impl YieldHook for NoYield {
    fn on_yield(&mut self, _progress: PassProgress) {}
}

/// Work counters for one pass. Not part of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassMetrics {
    /// Whole entries taken from the cache.
    pub cache_hits: u64,
    /// Repeats simulated by the engine.
    pub simulated_repeats: u64,
    /// Repeat count the final entry resumed from, when a tail snapshot was used.
    pub tail_resumed_at: Option<u64>,
    /// The seed matched the cached one.
    pub cache_reused: bool,
}

/// Result of a pass.
#[derive(Debug, Clone, PartialEq)]
pub enum PassOutcome {
    Completed {
        report: PredictionReport,
        metrics: PassMetrics,
    },
    /// A newer pass started; nothing is published.
    Superseded,
}

impl PassOutcome {
    pub fn report(&self) -> Option<&PredictionReport> {
        match self {
            PassOutcome::Completed { report, .. } => Some(report),
            PassOutcome::Superseded => None,
        }
    }

    pub fn metrics(&self) -> Option<&PassMetrics> {
        match self {
            PassOutcome::Completed { metrics, .. } => Some(metrics),
            PassOutcome::Superseded => None,
        }
    }

    pub fn into_report(self) -> Option<PredictionReport> {
        match self {
            PassOutcome::Completed { report, .. } => Some(report),
            PassOutcome::Superseded => None,
        }
    }
}
