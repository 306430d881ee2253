//! Random source abstraction for the bandit engine.

use rand::distributions::Bernoulli;
use rand::Rng;
use rand_distr::{Beta, Distribution};

/// The engine's only source of randomness.
///
/// Selection policies draw posterior samples through it and outcome oracles
/// draw simulated outcomes through it, so a run is reproducible exactly when
/// its random source is.
///
/// # Implementations
///
/// - **Simulation**: `SeededRandom` - ChaCha8 seeded from a single `u64`
/// - **Production**: `EntropyRandom` - `StdRng` seeded from OS entropy
///
/// Tests can implement the trait directly to script exact draws.
pub trait RandomSource: Send {
    /// Draws one value from `Beta(alpha, beta)`, in `[0, 1]`.
    ///
    /// Callers guarantee `alpha > 0` and `beta > 0`.
    fn sample_beta(&mut self, alpha: f64, beta: f64) -> f64;
    
    /// Draws one Bernoulli outcome with success probability `p`.
    fn bernoulli(&mut self, p: f64) -> bool;
    
    /// Returns the seed this source was created from (for logging).
    ///
    /// Entropy-seeded sources return 0.
    fn seed(&self) -> u64;
}

impl<T: RandomSource + ?Sized> RandomSource for Box<T> {
    fn sample_beta(&mut self, alpha: f64, beta: f64) -> f64 {
        (**self).sample_beta(alpha, beta)
    }
    
    fn bernoulli(&mut self, p: f64) -> bool {
        (**self).bernoulli(p)
    }
    
    fn seed(&self) -> u64 {
        (**self).seed()
    }
}

/// Beta draw shared by the concrete sources.
///
/// Falls back to the distribution mean if the parameters are rejected.
pub(crate) fn beta_draw<R: Rng + ?Sized>(rng: &mut R, alpha: f64, beta: f64) -> f64 {
    match Beta::new(alpha, beta) {
        Ok(dist) => dist.sample(rng).clamp(0.0, 1.0),
        Err(_) => alpha / (alpha + beta),
    }
}

/// Bernoulli draw shared by the concrete sources.
pub(crate) fn bernoulli_draw<R: Rng + ?Sized>(rng: &mut R, p: f64) -> bool {
    match Bernoulli::new(p.clamp(0.0, 1.0)) {
        Ok(dist) => dist.sample(rng),
        Err(_) => false,
    }
}
