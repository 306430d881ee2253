//! Simulated outcome oracle.
//!
//! The oracle is the only component that knows each arm's hidden success
//! probability. It turns a chosen arm into a coin flip with that probability;
//! the engine never sees the probability itself.

use bandit_core::{Arm, OutcomeOracle};
use bandit_env::RandomSource;

/// Bernoulli outcome oracle over arms' hidden probabilities.
#[derive(Debug, Clone, Default)]
pub struct BernoulliOracle {
    /// Outcomes generated so far
    draws: u64,
    
    /// Successful outcomes generated so far
    successes: u64,
}

impl BernoulliOracle {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn draws(&self) -> u64 {
        self.draws
    }
    
    pub fn successes(&self) -> u64 {
        self.successes
    }
}

impl OutcomeOracle for BernoulliOracle {
    fn outcome(&mut self, arm: &Arm, rng: &mut dyn RandomSource) -> bool {
        // An arm without a hidden probability never succeeds
        let p = arm.true_probability().unwrap_or(0.0);
        let success = rng.bernoulli(p);
        
        self.draws += 1;
        if success {
            self.successes += 1;
        }
        success
    }
}

/// Expected shortfall of the plays made against always playing the best arm.
///
/// `Σ_arms selections[i] · (p_best − p_i)`: the exploration cost of a run.
pub fn cumulative_regret(true_probabilities: &[f64], selections: &[u64]) -> f64 {
    let best = true_probabilities.iter().cloned().fold(0.0, f64::max);
    true_probabilities
        .iter()
        .zip(selections)
        .map(|(p, &n)| (best - p) * n as f64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bandit_env::{ArmId, SeededRandom};
    use proptest::prelude::*;
    
    #[test]
    fn test_oracle_extremes() {
        let mut oracle = BernoulliOracle::new();
        let mut rng = SeededRandom::new(42);
        let always = Arm::with_true_probability(ArmId(0), 1.0);
        let never = Arm::with_true_probability(ArmId(1), 0.0);
        
        for _ in 0..50 {
            assert!(oracle.outcome(&always, &mut rng));
            assert!(!oracle.outcome(&never, &mut rng));
        }
        assert_eq!(oracle.draws(), 100);
        assert_eq!(oracle.successes(), 50);
    }
    
    #[test]
    fn test_oracle_without_probability_fails() {
        let mut oracle = BernoulliOracle::new();
        let mut rng = SeededRandom::new(1);
        let arm = Arm::new(ArmId(0));
        
        assert!((0..20).all(|_| !oracle.outcome(&arm, &mut rng)));
    }
    
    #[test]
    fn test_oracle_frequency() {
        let mut oracle = BernoulliOracle::new();
        let mut rng = SeededRandom::new(7);
        let arm = Arm::with_true_probability(ArmId(0), 0.3);
        
        let n = 10_000;
        for _ in 0..n {
            oracle.outcome(&arm, &mut rng);
        }
        let rate = oracle.successes() as f64 / n as f64;
        assert!((rate - 0.3).abs() < 0.03, "observed rate {}", rate);
    }
    
    #[test]
    fn test_oracle_deterministic() {
        let arm = Arm::with_true_probability(ArmId(0), 0.5);
        let flips = |seed| {
            let mut oracle = BernoulliOracle::new();
            let mut rng = SeededRandom::new(seed);
            (0..64).map(|_| oracle.outcome(&arm, &mut rng)).collect::<Vec<_>>()
        };
        
        assert_eq!(flips(42), flips(42));
    }
    
    #[test]
    fn test_cumulative_regret() {
        let regret = cumulative_regret(&[0.2, 0.5, 0.75], &[10, 20, 70]);
        assert!((regret - (10.0 * 0.55 + 20.0 * 0.25)).abs() < 1e-9);
        
        assert_eq!(cumulative_regret(&[0.4], &[100]), 0.0);
        assert_eq!(cumulative_regret(&[0.2, 0.8], &[0, 0]), 0.0);
    }
    
    proptest! {
        #[test]
        fn prop_regret_bounded_by_worst_case(
            probabilities in prop::collection::vec(0.0f64..=1.0, 1..8),
            plays in prop::collection::vec(0u64..1_000, 8),
        ) {
            let selections = &plays[..probabilities.len()];
            let regret = cumulative_regret(&probabilities, selections);
            let total: u64 = selections.iter().sum();
            
            prop_assert!(regret >= 0.0);
            prop_assert!(regret <= total as f64 + 1e-9);
        }
    }
}
