//! Slow Refresh
//!
//! Reading the live game state for a seed can be expensive. In slow mode the
//! seed is read at most once per interval and reused in between.

use predictor_types::SimulationState;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::config::RefreshConfig;

#[derive(Debug, Clone)]
struct StoredSeed {
    state: SimulationState,
    next_update: Instant,
}

/// Seed reuse policy.
#[derive(Debug, Clone)]
pub struct SlowRefresh {
    enabled: bool,
    interval: Duration,
    stored: Option<StoredSeed>,
}

impl SlowRefresh {
    pub fn new(enabled: bool, interval: Duration) -> Self {
        Self {
            enabled,
            interval,
            stored: None,
        }
    }

    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(config.slow_mode, config.interval())
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the seed for a pass starting at `now`.
    ///
    /// `fresh` is only called when there is no stored seed or the stored one
    /// has expired.
    pub fn resolve(&mut self, now: Instant, fresh: impl FnOnce() -> SimulationState) -> SimulationState {
        if !self.enabled {
            return fresh();
        }
        if let Some(stored) = &self.stored {
            if now < stored.next_update {
                debug!("reusing stored seed");
                return stored.state.clone();
            }
        }
        let state = fresh();
        self.stored = Some(StoredSeed {
            state: state.clone(),
            next_update: now + self.interval,
        });
        state
    }

    /// Drops the stored seed so the next pass reads a fresh one.
    pub fn invalidate(&mut self) {
        self.stored = None;
    }
}
