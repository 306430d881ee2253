//! Bandit Simulation Harness
//!
//! Runs the Thompson Sampling engine against arms whose success
//! probabilities are known to the harness but hidden from the engine, and
//! checks that the engine finds and ranks them correctly.
//!
//! # Determinism
//!
//! All randomness of a run (posterior samples and simulated outcomes) comes
//! from one `SeededRandom`, so any result is reproducible from its seed.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         SimWorld                            │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │ TrialDriver (main thread, strictly sequential)       │   │
//! │  │   ThompsonSampling ─► BernoulliOracle ─► Arm.observe │   │
//! │  └───────────────────────────┬──────────────────────────┘   │
//! │                              │ Snapshot (try_send)          │
//! │  ┌───────────────────────────▼──────────────────────────┐   │
//! │  │ tokio runtime: snapshot recorder, time-limit timer   │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use bandit_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let runner = ScenarioRunner::new(42);
//! let result = runner.run(ScenarioId::ThreeCoins)?;
//! assert!(result.passed);
//! ```

mod world;
mod oracle;
mod runner;
mod exporter;
mod error;
pub mod scenarios;

pub use world::{SimWorld, SimRun};
pub use oracle::{BernoulliOracle, cumulative_regret};
pub use runner::{evaluate, time_limit_from_secs, ScenarioRunner, ScenarioResult, ScenarioMetrics, ConvergenceReport};
pub use exporter::{SimExport, record_snapshots, drain_snapshots};
pub use error::SimError;
