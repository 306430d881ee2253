//! Bandit Core - Thompson Sampling over Bernoulli/Beta arms
//!
//! Ranks competing binary-outcome sources (coins, items with hidden
//! click-through rates) while spending as few trials as possible on the
//! bad ones:
//! 1. **Posterior**: every arm carries a Beta(alpha, beta) belief, updated by
//!    one boolean observation at a time
//! 2. **Selection**: each trial samples every posterior once and plays the
//!    maximum, which explores wide posteriors and exploits high means
//! 3. **Ranking**: at any point the pool can be ordered by posterior mean

pub mod arm;
pub mod pool;
pub mod policy;
pub mod oracle;
pub mod ranking;
pub mod driver;
pub mod config;
pub mod error;

// Re-export key types for convenience
pub use arm::Arm;
pub use pool::Pool;
pub use policy::{Selection, SelectionPolicy, ThompsonSampling};
pub use oracle::OutcomeOracle;
pub use ranking::{best_arm, rank, rank_by_sample, RankedArm};
pub use driver::{CancelFlag, DriverState, RunReport, TrialDriver, TrialRecord};
pub use config::{RunConfig, ValidatedConfig};
pub use error::{ConfigError, DriverError};

pub use bandit_env::{ArmId, ArmState, RandomSource, Snapshot};
