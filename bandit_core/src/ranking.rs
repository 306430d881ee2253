//! Ranking extraction from a pool's posteriors.

use crate::arm::Arm;
use crate::pool::Pool;
use bandit_env::{ArmId, RandomSource};
use serde::{Deserialize, Serialize};

/// One entry of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedArm {
    /// 1-based position
    pub rank: usize,
    pub arm_id: ArmId,
    
    /// Hidden probability, for simulated arms
    #[serde(skip_serializing_if = "Option::is_none")]
    pub true_probability: Option<f64>,
    
    pub alpha: f64,
    pub beta: f64,
    pub posterior_mean: f64,
    pub trials_observed: f64,
}

impl RankedArm {
    fn from_arm(rank: usize, arm: &Arm) -> Self {
        Self {
            rank,
            arm_id: arm.id(),
            true_probability: arm.true_probability(),
            alpha: arm.alpha(),
            beta: arm.beta(),
            posterior_mean: arm.posterior_mean(),
            trials_observed: arm.trials_observed(),
        }
    }
}

/// Ranks arms by posterior mean, highest first; ties by ascending id.
///
/// Pure: calling it twice without intervening observations returns the
/// same ranking.
pub fn rank(pool: &Pool) -> Vec<RankedArm> {
    let keys: Vec<f64> = pool.arms().iter().map(Arm::posterior_mean).collect();
    rank_by_keys(pool, &keys)
}

/// Ranks arms by one fresh posterior sample each; ties by ascending id.
///
/// Gives a randomized ordering that respects uncertainty, e.g. for
/// rotating a displayed list.
pub fn rank_by_sample(pool: &Pool, rng: &mut dyn RandomSource) -> Vec<RankedArm> {
    let keys: Vec<f64> = pool.arms().iter().map(|arm| arm.sample(rng)).collect();
    rank_by_keys(pool, &keys)
}

/// Arm currently ranked first by posterior mean.
pub fn best_arm(pool: &Pool) -> Option<ArmId> {
    rank(pool).first().map(|r| r.arm_id)
}

fn rank_by_keys(pool: &Pool, keys: &[f64]) -> Vec<RankedArm> {
    let mut order: Vec<usize> = (0..pool.len()).collect();
    order.sort_by(|&a, &b| {
        keys[b]
            .total_cmp(&keys[a])
            .then_with(|| pool.arms()[a].id().cmp(&pool.arms()[b].id()))
    });
    
    order
        .into_iter()
        .enumerate()
        .map(|(pos, idx)| RankedArm::from_arm(pos + 1, &pool.arms()[idx]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bandit_env::SeededRandom;
    
    #[test]
    fn test_rank_priors_only() {
        let pool = Pool::from_probabilities(&[0.2, 0.5, 0.75]);
        let ranking = rank(&pool);
        
        let ids: Vec<ArmId> = ranking.iter().map(|r| r.arm_id).collect();
        assert_eq!(ids, vec![ArmId(0), ArmId(1), ArmId(2)]);
        for r in &ranking {
            assert_relative_eq!(r.posterior_mean, 0.5);
        }
        assert_eq!(ranking[2].true_probability, Some(0.75));
    }
    
    #[test]
    fn test_rank_by_posterior_mean() {
        let mut pool = Pool::with_uniform_priors(3);
        pool.observe(ArmId(0), false);
        pool.observe(ArmId(2), true);
        pool.observe(ArmId(2), true);
        pool.observe(ArmId(1), true);
        
        let ranking = rank(&pool);
        let ids: Vec<ArmId> = ranking.iter().map(|r| r.arm_id).collect();
        assert_eq!(ids, vec![ArmId(2), ArmId(1), ArmId(0)]);
        assert_eq!(ranking[0].rank, 1);
        assert_eq!(ranking[2].rank, 3);
        assert_eq!(best_arm(&pool), Some(ArmId(2)));
    }
    
    #[test]
    fn test_rank_ties_by_ascending_id() {
        let mut pool = Pool::with_uniform_priors(4);
        // Arms 1 and 3 both at 2/3
        pool.observe(ArmId(3), true);
        pool.observe(ArmId(1), true);
        
        let ids: Vec<ArmId> = rank(&pool).iter().map(|r| r.arm_id).collect();
        assert_eq!(ids, vec![ArmId(1), ArmId(3), ArmId(0), ArmId(2)]);
    }
    
    #[test]
    fn test_rank_is_pure() {
        let mut pool = Pool::with_uniform_priors(3);
        pool.observe(ArmId(1), true);
        let before = pool.clone();
        
        let first = rank(&pool);
        let second = rank(&pool);
        
        assert_eq!(first, second);
        assert_eq!(pool, before);
    }
    
    #[test]
    fn test_rank_by_sample_covers_all_arms() {
        let mut pool = Pool::with_uniform_priors(3);
        for _ in 0..100 {
            pool.observe(ArmId(2), true);
        }
        
        let mut rng = SeededRandom::new(5);
        let ranking = rank_by_sample(&pool, &mut rng);
        
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0].arm_id, ArmId(2));
    }
    
    #[test]
    fn test_best_arm_empty_pool() {
        assert_eq!(best_arm(&Pool::with_uniform_priors(0)), None);
    }
}
