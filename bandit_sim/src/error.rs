//! Error types for the simulation harness.

use bandit_core::{ConfigError, DriverError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),
    
    #[error("Simulation needs a true probability for every arm")]
    MissingProbabilities,
    
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    
    #[error("Snapshot recorder failed: {0}")]
    Recorder(String),
    
    #[error("A time limit inside a current-thread runtime would never fire; use a multi-thread runtime")]
    TimerNeedsWorker,
    
    #[error("Invalid time limit: {0} seconds")]
    InvalidTimeLimit(f64),
}
