//! Fixed-size, exclusively owned collection of arms.

use crate::arm::Arm;
use crate::config::ValidatedConfig;
use crate::error::ConfigError;
use bandit_env::{ArmId, ArmState, Snapshot};
use serde::{Deserialize, Serialize};

/// The arms of one run, in id order.
///
/// Created once per run; arms are never added or removed afterwards. The
/// only mutation path is [`Pool::observe`], which touches a single arm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PoolRecord")]
pub struct Pool {
    arms: Vec<Arm>,
}

#[derive(Deserialize)]
struct PoolRecord {
    arms: Vec<Arm>,
}

impl TryFrom<PoolRecord> for Pool {
    type Error = ConfigError;
    
    fn try_from(record: PoolRecord) -> Result<Self, Self::Error> {
        // Ids double as indices
        if let Some((position, arm)) = record
            .arms
            .iter()
            .enumerate()
            .find(|(i, arm)| arm.id().index() != *i)
        {
            return Err(ConfigError::ArmOutOfOrder {
                position,
                id: arm.id().index(),
            });
        }
        Ok(Self { arms: record.arms })
    }
}

impl Pool {
    /// Creates `arm_count` arms with uniform priors and no hidden probability.
    pub fn with_uniform_priors(arm_count: usize) -> Self {
        Self {
            arms: (0..arm_count).map(|i| Arm::new(ArmId(i))).collect(),
        }
    }
    
    /// Creates simulated arms, one per hidden probability.
    pub fn from_probabilities(probabilities: &[f64]) -> Self {
        Self {
            arms: probabilities
                .iter()
                .enumerate()
                .map(|(i, &p)| Arm::with_true_probability(ArmId(i), p))
                .collect(),
        }
    }
    
    /// Creates the pool described by a validated configuration.
    pub fn from_config(config: &ValidatedConfig) -> Self {
        match config.true_probabilities() {
            Some(probabilities) => Self::from_probabilities(probabilities),
            None => Self::with_uniform_priors(config.arm_count()),
        }
    }
    
    pub fn len(&self) -> usize {
        self.arms.len()
    }
    
    pub fn is_empty(&self) -> bool {
        self.arms.is_empty()
    }
    
    pub fn arms(&self) -> &[Arm] {
        &self.arms
    }
    
    pub fn get(&self, id: ArmId) -> Option<&Arm> {
        self.arms.get(id.index())
    }
    
    /// Routes an outcome to one arm. Returns false for an unknown id.
    pub fn observe(&mut self, id: ArmId, success: bool) -> bool {
        match self.arms.get_mut(id.index()) {
            Some(arm) => {
                arm.observe(success);
                true
            }
            None => false,
        }
    }
    
    /// Posterior parameters of every arm, in pool order.
    pub fn states(&self) -> Vec<ArmState> {
        self.arms.iter().map(Arm::state).collect()
    }
    
    /// Immutable snapshot for the sink boundary.
    pub fn snapshot(&self, trial_index: u64) -> Snapshot {
        Snapshot::new(trial_index, self.states())
    }
    
    /// Sum of `alpha - 1 + beta - 1` over all arms.
    pub fn total_observations(&self) -> f64 {
        self.arms.iter().map(Arm::trials_observed).sum()
    }
}
