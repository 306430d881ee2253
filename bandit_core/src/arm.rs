//! A single arm and its Beta posterior.

use crate::error::ConfigError;
use bandit_env::{ArmId, ArmState, RandomSource};
use serde::{Deserialize, Serialize};

/// One binary-outcome source and the engine's belief about it.
///
/// The belief is `Beta(alpha, beta)`, starting from the uniform prior
/// `Beta(1, 1)`. After `k` successes and `m` failures it is
/// `Beta(1 + k, 1 + m)`.
///
/// `true_probability` exists only for simulation: outcome oracles may read it,
/// the selection policy and `observe` never do.
///
/// Deserialized arms are checked against the same shape: integral
/// `alpha, beta >= 1` and a hidden probability in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ArmRecord")]
pub struct Arm {
    id: ArmId,
    alpha: f64,
    beta: f64,
    true_probability: Option<f64>,
}

impl Arm {
    /// Creates an arm with the uniform prior.
    pub fn new(id: ArmId) -> Self {
        Self {
            id,
            alpha: 1.0,
            beta: 1.0,
            true_probability: None,
        }
    }
    
    /// Creates a simulated arm with a hidden success probability.
    pub fn with_true_probability(id: ArmId, p: f64) -> Self {
        Self {
            true_probability: Some(p),
            ..Self::new(id)
        }
    }
    
    pub fn id(&self) -> ArmId {
        self.id
    }
    
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
    
    pub fn beta(&self) -> f64 {
        self.beta
    }
    
    /// Hidden success probability (simulation only).
    pub fn true_probability(&self) -> Option<f64> {
        self.true_probability
    }
    
    /// Draws one value from the posterior. Leaves the posterior untouched.
    pub fn sample(&self, rng: &mut dyn RandomSource) -> f64 {
        rng.sample_beta(self.alpha, self.beta)
    }
    
    /// Folds one outcome into the posterior.
    pub fn observe(&mut self, success: bool) {
        if success {
            self.alpha += 1.0;
        } else {
            self.beta += 1.0;
        }
    }
    
    /// Point estimate of the success probability.
    pub fn posterior_mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }
    
    /// Variance of the Beta posterior; shrinks as observations accumulate.
    pub fn posterior_variance(&self) -> f64 {
        let sum = self.alpha + self.beta;
        (self.alpha * self.beta) / (sum * sum * (sum + 1.0))
    }
    
    /// Number of outcomes observed so far.
    pub fn trials_observed(&self) -> f64 {
        self.alpha + self.beta - 2.0
    }
    
    pub fn successes(&self) -> f64 {
        self.alpha - 1.0
    }
    
    pub fn failures(&self) -> f64 {
        self.beta - 1.0
    }
    
    /// Copies out the posterior parameters.
    pub fn state(&self) -> ArmState {
        ArmState {
            arm_id: self.id,
            alpha: self.alpha,
            beta: self.beta,
        }
    }
}

/// Wire form of an [`Arm`], before its posterior is checked.
#[derive(Deserialize)]
struct ArmRecord {
    id: ArmId,
    alpha: f64,
    beta: f64,
    #[serde(default)]
    true_probability: Option<f64>,
}

/// A count reachable from the prior by whole observations.
fn reachable(parameter: f64) -> bool {
    parameter.is_finite() && parameter >= 1.0 && parameter.fract() == 0.0
}

impl TryFrom<ArmRecord> for Arm {
    type Error = ConfigError;
    
    fn try_from(record: ArmRecord) -> Result<Self, Self::Error> {
        if !reachable(record.alpha) || !reachable(record.beta) {
            return Err(ConfigError::InvalidPosterior {
                arm: record.id.index(),
                alpha: record.alpha,
                beta: record.beta,
            });
        }
        if let Some(p) = record.true_probability {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::ProbabilityOutOfRange {
                    arm: record.id.index(),
                    value: p,
                });
            }
        }
        
        Ok(Self {
            id: record.id,
            alpha: record.alpha,
            beta: record.beta,
            true_probability: record.true_probability,
        })
    }
}
