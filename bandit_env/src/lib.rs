//! Bandit Environment Abstraction Layer
//!
//! This crate isolates everything the bandit engine needs from the outside
//! world so that a run is either fully reproducible (simulation) or driven by
//! real entropy (production):
//!
//! - **Randomness**: [`RandomSource`] is the only way the engine draws random
//!   numbers. [`SeededRandom`] derives every draw from one 64-bit seed,
//!   [`EntropyRandom`] is seeded from the OS.
//! - **Snapshots**: [`SnapshotSink`] is the one-way boundary towards
//!   rendering/recording collaborators. [`ChannelSink`] hands values off to a
//!   bounded tokio channel without ever waiting on the receiver.
//!
//! # Example
//!
//! ```ignore
//! use bandit_env::{RandomSource, SeededRandom};
//!
//! let mut rng = SeededRandom::new(42);
//! let draw = rng.sample_beta(3.0, 2.0);
//! assert!((0.0..=1.0).contains(&draw));
//! ```

mod random;
mod seeded;
mod entropy;
mod sink;
mod types;
mod error;

pub use random::RandomSource;
pub use seeded::SeededRandom;
pub use entropy::EntropyRandom;
pub use sink::{SnapshotSink, ChannelSink, FnSink};
pub use types::{ArmId, ArmState, Snapshot};
pub use error::SinkError;
