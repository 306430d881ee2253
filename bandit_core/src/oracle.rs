//! Outcome oracle boundary.

use crate::arm::Arm;
use bandit_env::RandomSource;

/// Supplies the outcome of playing an arm.
///
/// In simulation this is a Bernoulli draw against the arm's hidden
/// probability; in a live system it is the observed result (click or no
/// click). The engine's selection never depends on which one is plugged in.
pub trait OutcomeOracle {
    fn outcome(&mut self, arm: &Arm, rng: &mut dyn RandomSource) -> bool;
}

impl<F> OutcomeOracle for F
where
    F: FnMut(&Arm, &mut dyn RandomSource) -> bool,
{
    fn outcome(&mut self, arm: &Arm, rng: &mut dyn RandomSource) -> bool {
        self(arm, rng)
    }
}
