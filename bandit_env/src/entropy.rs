//! Production random source seeded from OS entropy.

use crate::random::{bernoulli_draw, beta_draw, RandomSource};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Random source for live use, when no seed is configured.
///
/// Draws are not reproducible across runs.
pub struct EntropyRandom {
    rng: StdRng,
}

impl EntropyRandom {
    /// Creates a new source seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Default for EntropyRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomSource for EntropyRandom {
    fn sample_beta(&mut self, alpha: f64, beta: f64) -> f64 {
        beta_draw(&mut self.rng, alpha, beta)
    }
    
    fn bernoulli(&mut self, p: f64) -> bool {
        bernoulli_draw(&mut self.rng, p)
    }
    
    fn seed(&self) -> u64 {
        // Not seeded
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_entropy_random_seed() {
        let rng = EntropyRandom::new();
        assert_eq!(rng.seed(), 0);
    }
    
    #[test]
    fn test_entropy_random_draws_vary() {
        let mut rng = EntropyRandom::new();
        let draws: Vec<f64> = (0..20).map(|_| rng.sample_beta(1.0, 1.0)).collect();
        
        // 20 uniform draws being all identical is practically impossible
        assert!(draws.iter().any(|d| *d != draws[0]));
    }
}
