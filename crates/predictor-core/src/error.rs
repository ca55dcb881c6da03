//! Top-level error type for the predictor binary.

use thiserror::Error;

use crate::config::ConfigError;
use crate::setup::ScenarioError;

/// Any failure the command line tool can report.
#[derive(Debug, Error)]
pub enum PredictorError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("scenario error: {0}")]
    Scenario(#[from] ScenarioError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
