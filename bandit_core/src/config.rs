//! Run configuration and its validation.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Raw configuration for a run, as supplied by a caller or a config file.
///
/// Counts are signed so that bad input surfaces as a [`ConfigError`] rather
/// than a parse failure. Call [`RunConfig::validate`] before running.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Number of arms (>= 1)
    pub arm_count: i64,
    
    /// Hidden success probabilities, simulation mode only
    #[serde(default)]
    pub true_probabilities: Option<Vec<f64>>,
    
    /// Number of trials (>= 0)
    pub trial_count: i64,
    
    /// Trials after which a snapshot is emitted, each in [0, trial_count)
    #[serde(default)]
    pub snapshot_trial_indices: BTreeSet<i64>,
    
    /// Seed for reproducible runs; `None` draws from OS entropy
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl RunConfig {
    /// Simulation configuration with one arm per hidden probability.
    pub fn simulation(true_probabilities: Vec<f64>, trial_count: i64) -> Self {
        Self {
            arm_count: true_probabilities.len() as i64,
            true_probabilities: Some(true_probabilities),
            trial_count,
            ..Default::default()
        }
    }
    
    /// Live configuration: outcomes come from the outside world.
    pub fn live(arm_count: i64, trial_count: i64) -> Self {
        Self {
            arm_count,
            trial_count,
            ..Default::default()
        }
    }
    
    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }
    
    /// Sets the snapshot trial indices.
    pub fn with_snapshots(mut self, indices: impl IntoIterator<Item = i64>) -> Self {
        self.snapshot_trial_indices = indices.into_iter().collect();
        self
    }
    
    /// Checks every constraint; nothing runs unless this succeeds.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        if self.arm_count < 1 {
            return Err(ConfigError::NoArms);
        }
        let arm_count = usize::try_from(self.arm_count)
            .map_err(|_| ConfigError::ArmCountTooLarge(self.arm_count))?;
        
        if let Some(probabilities) = &self.true_probabilities {
            if probabilities.len() != arm_count {
                return Err(ConfigError::ProbabilityCountMismatch {
                    expected: arm_count,
                    actual: probabilities.len(),
                });
            }
            // Written so NaN fails too
            if let Some((arm, &value)) = probabilities
                .iter()
                .enumerate()
                .find(|(_, p)| !(0.0..=1.0).contains(*p))
            {
                return Err(ConfigError::ProbabilityOutOfRange { arm, value });
            }
        }
        
        if self.trial_count < 0 {
            return Err(ConfigError::NegativeTrialCount(self.trial_count));
        }
        
        if let Some(&index) = self
            .snapshot_trial_indices
            .iter()
            .find(|&&i| i < 0 || i >= self.trial_count)
        {
            return Err(ConfigError::SnapshotIndexOutOfRange {
                index,
                trial_count: self.trial_count,
            });
        }
        
        Ok(ValidatedConfig {
            arm_count,
            true_probabilities: self.true_probabilities.clone(),
            trial_count: self.trial_count as u64,
            snapshot_trial_indices: self
                .snapshot_trial_indices
                .iter()
                .map(|&i| i as u64)
                .collect(),
            random_seed: self.random_seed,
        })
    }
}

/// Configuration that passed validation. Only [`RunConfig::validate`]
/// produces one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedConfig {
    arm_count: usize,
    true_probabilities: Option<Vec<f64>>,
    trial_count: u64,
    snapshot_trial_indices: BTreeSet<u64>,
    random_seed: Option<u64>,
}

impl ValidatedConfig {
    pub fn arm_count(&self) -> usize {
        self.arm_count
    }
    
    pub fn true_probabilities(&self) -> Option<&[f64]> {
        self.true_probabilities.as_deref()
    }
    
    pub fn trial_count(&self) -> u64 {
        self.trial_count
    }
    
    pub fn snapshot_trial_indices(&self) -> &BTreeSet<u64> {
        &self.snapshot_trial_indices
    }
    
    pub fn random_seed(&self) -> Option<u64> {
        self.random_seed
    }
}
