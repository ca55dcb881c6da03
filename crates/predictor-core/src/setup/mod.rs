//! Predictor Setup
//!
//! Sample action catalog and scenario file loading.

pub mod catalog;
pub mod scenario;

pub use catalog::*;
pub use scenario::*;
