//! Incremental Cache
//!
//! A keyed prefix store of snapshots. A pass walks the cache in step with the
//! action list: every entry whose key matches the previous pass is reused, and
//! the first mismatch truncates everything after it.
//!
//! Position 0 is the seed. Position `n` is the value recorded after the `n`th
//! entry. Values are owned clones, so later mutation of live state never
//! reaches a cached entry.

use predictor_types::SimulationState;

use crate::world::WorldSnapshot;

/// One recorded key/value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<K, V> {
    pub key: K,
    pub value: V,
}

/// Prefix-memoized snapshot store.
#[derive(Debug, Clone)]
pub struct IncrementalCache<K, V> {
    seed: Option<V>,
    entries: Vec<CacheEntry<K, V>>,
    cursor: usize,
    enabled: bool,
}

impl<K, V> Default for IncrementalCache<K, V> {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<K, V> IncrementalCache<K, V> {
    pub fn new(enabled: bool) -> Self {
        Self {
            seed: None,
            entries: Vec::new(),
            cursor: 0,
            enabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of recorded entries, not counting the seed.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current cursor position. Zero means the cursor sits on the seed.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|e| &e.key)
    }

    /// Drops everything after the cursor.
    ///
    /// With `invalidate_current`, the entry under the cursor goes too and the
    /// cursor steps back onto the previous one.
    pub fn miss(&mut self, invalidate_current: bool) {
        if invalidate_current {
            if self.cursor > 0 {
                self.cursor -= 1;
            } else {
                self.seed = None;
            }
        }
        self.entries.truncate(self.cursor);
    }

    /// Forgets everything.
    pub fn clear(&mut self) {
        self.seed = None;
        self.entries.clear();
        self.cursor = 0;
    }
}

impl<K: PartialEq, V: Clone + PartialEq> IncrementalCache<K, V> {
    /// Starts a walk from `seed`.
    ///
    /// Returns true when the seed equals the one previously stored, meaning the
    /// recorded prefix may be reused. Otherwise everything is dropped and the
    /// new seed is stored.
    pub fn reset(&mut self, seed: &V) -> bool {
        self.cursor = 0;
        if !self.enabled {
            return false;
        }
        if self.seed.as_ref() == Some(seed) {
            return true;
        }
        self.entries.clear();
        self.seed = Some(seed.clone());
        false
    }

    /// Returns the value recorded for `key` at the next position and advances.
    ///
    /// A different key truncates the cache at the cursor.
    pub fn next(&mut self, key: &K) -> Option<V> {
        if !self.enabled {
            return None;
        }
        match self.entries.get(self.cursor) {
            Some(entry) if entry.key == *key => {
                self.cursor += 1;
                Some(entry.value.clone())
            }
            _ => {
                self.miss(false);
                None
            }
        }
    }

    /// Records a value at the cursor, replacing anything after it.
    pub fn add(&mut self, key: K, value: V) {
        if !self.enabled || self.seed.is_none() {
            return;
        }
        self.entries.truncate(self.cursor);
        self.entries.push(CacheEntry { key, value });
        self.cursor = self.entries.len();
    }
}

/// Key of one cached position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheKey {
    /// State after a whole non-final entry.
    Entry { name: String, repeats: u64, disabled: bool },
    /// State part way through the final entry.
    Tail { name: String, disabled: bool },
}

/// State, running total and validity after some prefix of the list.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub state: SimulationState,
    pub total: f64,
    pub valid: bool,
    /// Repeats executed by the entry that produced this checkpoint.
    pub repeats: u64,
}

/// Value stored in the predictor's cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheData {
    /// Everything that decides whether a recorded prefix still applies.
    Seed {
        state: SimulationState,
        affected: Vec<String>,
        world: WorldSnapshot,
    },
    Entry(Checkpoint),
    Tail { checkpoint: Checkpoint, repeats_done: u64 },
}

/// Cache used by the predictor.
pub type PredictionCache = IncrementalCache<CacheKey, CacheData>;

/// Zero-based repeat index after which the tail snapshot is recorded.
pub fn tail_snapshot_index(repeats: u64) -> u64 {
    repeats.saturating_mul(9) / 10
}

/// Whether a tail snapshot must be dropped and recorded again at the new 90% point.
pub fn tail_is_stale(repeats_done: u64, repeats: u64) -> bool {
    repeats_done <= tail_snapshot_index(repeats)
}
