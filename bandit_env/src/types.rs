//! Common types shared across the bandit engine boundary.

use serde::{Deserialize, Serialize};

/// Stable identifier of an arm: its position within the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ArmId(pub usize);

impl ArmId {
    /// Returns the pool index.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for ArmId {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl std::fmt::Display for ArmId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "arm-{}", self.0)
    }
}

/// Posterior parameters of one arm at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArmState {
    pub arm_id: ArmId,
    pub alpha: f64,
    pub beta: f64,
}

/// Immutable record of every arm's posterior after a given trial.
///
/// This is the only value that crosses the snapshot boundary; the consumer
/// owns its copy and can never observe later mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Zero-based index of the trial that just completed
    pub trial_index: u64,
    
    /// All arms in pool order
    pub arms: Vec<ArmState>,
}

impl Snapshot {
    /// Creates a snapshot.
    pub fn new(trial_index: u64, arms: Vec<ArmState>) -> Self {
        Self { trial_index, arms }
    }
    
    /// Returns the number of observations folded into the snapshot.
    pub fn observations(&self) -> f64 {
        self.arms.iter().map(|a| a.alpha + a.beta - 2.0).sum()
    }
}
