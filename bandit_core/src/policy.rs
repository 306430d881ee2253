//! Arm selection policies.

use crate::pool::Pool;
use bandit_env::{ArmId, RandomSource};

/// Outcome of one selection: the winning arm and every sample drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub arm: ArmId,
    
    /// One sample per arm, in pool order
    pub samples: Vec<f64>,
}

/// Chooses which arm to play next.
///
/// Policies hold no per-run state; everything they need lives in the arms'
/// posteriors. Returns `None` only for an empty pool.
pub trait SelectionPolicy {
    fn select(&self, pool: &Pool, rng: &mut dyn RandomSource) -> Option<Selection>;
    
    /// Short name for logs and exports.
    fn name(&self) -> &'static str;
}

/// Thompson Sampling: sample every posterior once, play the maximum.
///
/// Arms with wide posteriors occasionally produce the top sample and get
/// explored; arms with high means usually do and get exploited. There is no
/// exploration schedule to tune.
///
/// Ties go to the lowest arm id.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThompsonSampling;

impl SelectionPolicy for ThompsonSampling {
    fn select(&self, pool: &Pool, rng: &mut dyn RandomSource) -> Option<Selection> {
        let samples: Vec<f64> = pool.arms().iter().map(|arm| arm.sample(rng)).collect();
        
        let mut best: Option<(usize, f64)> = None;
        for (idx, &sample) in samples.iter().enumerate() {
            match best {
                // Strictly greater only: earlier arms keep ties
                Some((_, top)) if sample <= top => {}
                _ => best = Some((idx, sample)),
            }
        }
        
        best.map(|(idx, _)| Selection {
            arm: pool.arms()[idx].id(),
            samples,
        })
    }
    
    fn name(&self) -> &'static str {
        "thompson_sampling"
    }
}
