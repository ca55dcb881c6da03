//! Core prediction logic: action catalog, stat model, engine, incremental cache.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod pass;
pub mod predictor;
pub mod refresh;
pub mod report;
pub mod setup;
pub mod stats;
pub mod world;

pub use cache::{CacheData, CacheKey, Checkpoint, IncrementalCache, PredictionCache};
pub use catalog::{ActionDefinition, ActionMeta, Catalog, LoopContext, LoopDefinition};
pub use config::{ConfigError, PredictorConfig};
pub use engine::{RepeatOutcome, RepeatPlan, SimulationEngine, TickFlow};
pub use error::PredictorError;
pub use pass::{NoYield, PassControl, PassHandle, PassMetrics, PassOutcome, PassProgress, YieldHook};
pub use predictor::Predictor;
pub use refresh::SlowRefresh;
pub use world::WorldSnapshot;
