//! Error types for the bandit engine.

use crate::driver::DriverState;
use thiserror::Error;

/// Configuration problems, all detected before the first trial.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("At least one arm is required")]
    NoArms,
    
    #[error("Arm count {0} does not fit this platform")]
    ArmCountTooLarge(i64),
    
    #[error("Expected {expected} true probabilities, got {actual}")]
    ProbabilityCountMismatch { expected: usize, actual: usize },
    
    #[error("True probability of arm {arm} is {value}, must be in [0, 1]")]
    ProbabilityOutOfRange { arm: usize, value: f64 },
    
    #[error("Trial count must not be negative: {0}")]
    NegativeTrialCount(i64),
    
    #[error("Snapshot index {index} outside [0, {trial_count})")]
    SnapshotIndexOutOfRange { index: i64, trial_count: i64 },
    
    #[error("Arm {arm} has posterior Beta({alpha}, {beta}), not reachable from the prior")]
    InvalidPosterior { arm: usize, alpha: f64, beta: f64 },
    
    #[error("Arm at position {position} has id {id}")]
    ArmOutOfOrder { position: usize, id: usize },
}

/// Errors from driving a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("Driver is {0}, runs can only start from idle")]
    NotIdle(DriverState),
}
