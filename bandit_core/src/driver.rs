//! Sequential trial driver.
//!
//! Runs `T` trials against a pool, strictly one after another:
//!
//! ```text
//! ┌───────────┐   select    ┌────────┐   outcome   ┌────────┐
//! │  Policy   │────────────►│ Oracle │────────────►│  Arm   │
//! └───────────┘             └────────┘   observe   └────────┘
//!       ▲                                              │
//!       └──────────── next trial sees update ──────────┘
//!                                                      │
//!                               snapshot (try_send) ───┴──► Sink
//! ```
//!
//! The posterior of trial `i`'s arm is updated before trial `i + 1` samples.
//! The sink hand-off never waits on the consumer.

use crate::config::ValidatedConfig;
use crate::error::DriverError;
use crate::oracle::OutcomeOracle;
use crate::policy::{SelectionPolicy, ThompsonSampling};
use crate::pool::Pool;
use crate::ranking::{rank, RankedArm};
use bandit_env::{ArmId, RandomSource, SnapshotSink};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of a driver. A driver runs at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriverState {
    Idle,
    Running,
    Completed,
}

impl std::fmt::Display for DriverState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DriverState::Idle => "idle",
            DriverState::Running => "running",
            DriverState::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}

/// Run-level cancellation, checked between trials.
///
/// Raising the flag lets the current trial finish and schedules no more.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Audit record of one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub trial_index: u64,
    pub arm_id: ArmId,
    pub outcome: bool,

    /// Posterior samples drawn for every arm, in pool order
    pub samples: Vec<f64>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Trials that fully completed
    pub trials_executed: u64,

    /// Run stopped early by a `CancelFlag`
    pub cancelled: bool,

    /// Snapshots accepted by the sink
    pub snapshots_emitted: u64,

    /// Snapshots the sink refused (logged, never fatal)
    pub snapshot_failures: u64,

    /// Times each arm was selected, by arm index
    pub selections: Vec<u64>,

    /// Successful outcomes per arm, by arm index
    pub successes: Vec<u64>,

    /// Per-trial audit log, if enabled
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub trials: Vec<TrialRecord>,
}

impl RunReport {
    fn new(arm_count: usize) -> Self {
        Self {
            selections: vec![0; arm_count],
            successes: vec![0; arm_count],
            ..Default::default()
        }
    }

    fn record(&mut self, arm: ArmId, outcome: bool) {
        if let Some(count) = self.selections.get_mut(arm.index()) {
            *count += 1;
        }
        if outcome {
            if let Some(count) = self.successes.get_mut(arm.index()) {
                *count += 1;
            }
        }
        self.trials_executed += 1;
    }
}

/// Drives a single run: selection, outcome, update, snapshot.
pub struct TrialDriver<O, R, P = ThompsonSampling> {
    /// Arms of this run (exclusively owned)
    pool: Pool,

    policy: P,

    oracle: O,

    /// The run's only random source
    rng: R,

    trial_count: u64,

    snapshot_indices: BTreeSet<u64>,

    sink: Option<Box<dyn SnapshotSink>>,

    cancel: Option<CancelFlag>,

    record_trials: bool,

    state: DriverState,
}

impl<O: OutcomeOracle, R: RandomSource> TrialDriver<O, R, ThompsonSampling> {
    /// Creates a Thompson Sampling driver for a validated configuration.
    pub fn new(config: &ValidatedConfig, oracle: O, rng: R) -> Self {
        Self {
            pool: Pool::from_config(config),
            policy: ThompsonSampling,
            oracle,
            rng,
            trial_count: config.trial_count(),
            snapshot_indices: config.snapshot_trial_indices().clone(),
            sink: None,
            cancel: None,
            record_trials: false,
            state: DriverState::Idle,
        }
    }
}

impl<O: OutcomeOracle, R: RandomSource, P: SelectionPolicy> TrialDriver<O, R, P> {
    /// Replaces the selection policy.
    pub fn with_policy<Q: SelectionPolicy>(self, policy: Q) -> TrialDriver<O, R, Q> {
        TrialDriver {
            pool: self.pool,
            policy,
            oracle: self.oracle,
            rng: self.rng,
            trial_count: self.trial_count,
            snapshot_indices: self.snapshot_indices,
            sink: self.sink,
            cancel: self.cancel,
            record_trials: self.record_trials,
            state: self.state,
        }
    }

    /// Attaches the snapshot consumer.
    pub fn with_sink(mut self, sink: impl SnapshotSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Attaches a cancellation flag.
    pub fn with_cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Keeps a `TrialRecord` for every trial in the report.
    pub fn with_trial_log(mut self) -> Self {
        self.record_trials = true;
        self
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Consumes the driver, returning the final pool.
    pub fn into_pool(self) -> Pool {
        self.pool
    }

    /// Current ranking by posterior mean.
    pub fn rank(&self) -> Vec<RankedArm> {
        rank(&self.pool)
    }

    /// Runs every configured trial. Only valid from `Idle`.
    pub fn run(&mut self) -> Result<RunReport, DriverError> {
        if self.state != DriverState::Idle {
            return Err(DriverError::NotIdle(self.state));
        }
        self.state = DriverState::Running;

        info!(
            "Starting run: {} arms, {} trials, policy={}, seed={}",
            self.pool.len(),
            self.trial_count,
            self.policy.name(),
            self.rng.seed()
        );

        let mut report = RunReport::new(self.pool.len());

        for trial_index in 0..self.trial_count {
            if self.cancel.as_ref().is_some_and(CancelFlag::is_cancelled) {
                warn!("Run cancelled after {} trials", report.trials_executed);
                report.cancelled = true;
                break;
            }

            let Some(selection) = self.policy.select(&self.pool, &mut self.rng) else {
                break;
            };
            let Some(arm) = self.pool.get(selection.arm) else {
                break;
            };
            let outcome = self.oracle.outcome(arm, &mut self.rng);

            self.pool.observe(selection.arm, outcome);
            report.record(selection.arm, outcome);

            if self.record_trials {
                report.trials.push(TrialRecord {
                    trial_index,
                    arm_id: selection.arm,
                    outcome,
                    samples: selection.samples,
                });
            }

            if self.snapshot_indices.contains(&trial_index) {
                self.emit_snapshot(trial_index, &mut report);
            }
        }

        self.state = DriverState::Completed;

        info!(
            "Run completed: {} trials, {} snapshots ({} failed)",
            report.trials_executed, report.snapshots_emitted, report.snapshot_failures
        );

        Ok(report)
    }

    fn emit_snapshot(&mut self, trial_index: u64, report: &mut RunReport) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };

        match sink.emit(self.pool.snapshot(trial_index)) {
            Ok(()) => {
                debug!("Snapshot emitted at trial {}", trial_index);
                report.snapshots_emitted += 1;
            }
            Err(e) => {
                warn!("Snapshot at trial {} dropped: {}", trial_index, e);
                report.snapshot_failures += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::Arm;
    use crate::config::RunConfig;
    use approx::assert_relative_eq;
    use bandit_env::{FnSink, SeededRandom, SinkError, Snapshot};
    use proptest::prelude::*;
    use std::sync::Mutex;

    fn bernoulli(arm: &Arm, rng: &mut dyn RandomSource) -> bool {
        rng.bernoulli(arm.true_probability().unwrap_or(0.0))
    }

    fn collecting_sink() -> (impl SnapshotSink, Arc<Mutex<Vec<Snapshot>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let inner = Arc::clone(&seen);
        let sink = FnSink::new(move |s: Snapshot| {
            inner.lock().unwrap().push(s);
            Ok(())
        });
        (sink, seen)
    }

    #[test]
    fn test_zero_trials() {
        let config = RunConfig::simulation(vec![0.2, 0.5, 0.75], 0)
            .with_seed(1)
            .validate()
            .unwrap();
        let mut driver = TrialDriver::new(&config, bernoulli, SeededRandom::new(1));
        assert_eq!(driver.state(), DriverState::Idle);

        let report = driver.run().unwrap();

        assert_eq!(driver.state(), DriverState::Completed);
        assert_eq!(report.trials_executed, 0);
        let ranking = driver.rank();
        let ids: Vec<ArmId> = ranking.iter().map(|r| r.arm_id).collect();
        assert_eq!(ids, vec![ArmId(0), ArmId(1), ArmId(2)]);
        for r in &ranking {
            assert_relative_eq!(r.posterior_mean, 0.5);
        }
    }

    #[test]
    fn test_single_arm_selected_every_trial() {
        let config = RunConfig::simulation(vec![0.3], 250).validate().unwrap();
        let mut driver = TrialDriver::new(&config, bernoulli, SeededRandom::new(9));

        let report = driver.run().unwrap();

        assert_eq!(report.selections, vec![250]);
        let arm = &driver.pool().arms()[0];
        assert_eq!(arm.alpha() + arm.beta() - 2.0, 250.0);
        assert_eq!(arm.successes() as u64, report.successes[0]);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let config = RunConfig::simulation(vec![0.2, 0.5, 0.75], 500)
            .with_seed(42)
            .validate()
            .unwrap();

        let run = || {
            let mut driver = TrialDriver::new(&config, bernoulli, SeededRandom::new(42))
                .with_trial_log();
            let report = driver.run().unwrap();
            let selected: Vec<ArmId> = report.trials.iter().map(|t| t.arm_id).collect();
            (selected, driver.rank())
        };

        let (selected1, ranking1) = run();
        let (selected2, ranking2) = run();

        assert_eq!(selected1.len(), 500);
        assert_eq!(selected1, selected2);
        assert_eq!(ranking1, ranking2);
    }

    #[test]
    fn test_trial_log_samples_match_pool() {
        let config = RunConfig::simulation(vec![0.1, 0.9], 20).validate().unwrap();
        let mut driver = TrialDriver::new(&config, bernoulli, SeededRandom::new(3))
            .with_trial_log();

        let report = driver.run().unwrap();

        assert_eq!(report.trials.len(), 20);
        for (i, record) in report.trials.iter().enumerate() {
            assert_eq!(record.trial_index, i as u64);
            assert_eq!(record.samples.len(), 2);
            // Selected arm holds the maximum sample
            let max = record.samples.iter().cloned().fold(f64::MIN, f64::max);
            assert_eq!(record.samples[record.arm_id.index()], max);
        }
    }

    #[test]
    fn test_snapshots_at_configured_indices() {
        let config = RunConfig::simulation(vec![0.4, 0.6], 100)
            .with_snapshots([0, 9, 99])
            .validate()
            .unwrap();
        let (sink, seen) = collecting_sink();
        let mut driver = TrialDriver::new(&config, bernoulli, SeededRandom::new(5))
            .with_sink(sink);

        let report = driver.run().unwrap();

        assert_eq!(report.snapshots_emitted, 3);
        let seen = seen.lock().unwrap();
        let indices: Vec<u64> = seen.iter().map(|s| s.trial_index).collect();
        assert_eq!(indices, vec![0, 9, 99]);
        for snap in seen.iter() {
            // Snapshot taken after the trial's update
            assert_eq!(snap.observations(), (snap.trial_index + 1) as f64);
            assert_eq!(snap.arms.len(), 2);
        }
    }

    #[test]
    fn test_each_trial_updates_exactly_one_arm() {
        let config = RunConfig::simulation(vec![0.2, 0.5, 0.75, 0.9], 60)
            .with_snapshots(0..60)
            .validate()
            .unwrap();
        let (sink, seen) = collecting_sink();
        let mut driver = TrialDriver::new(&config, bernoulli, SeededRandom::new(77))
            .with_sink(sink);
        driver.run().unwrap();

        let seen = seen.lock().unwrap();
        let mut previous = vec![(1.0, 1.0); 4];
        for snap in seen.iter() {
            let changed: Vec<f64> = snap
                .arms
                .iter()
                .zip(&previous)
                .map(|(a, (pa, pb))| (a.alpha - pa) + (a.beta - pb))
                .filter(|d| *d != 0.0)
                .collect();
            assert_eq!(changed, vec![1.0]);
            previous = snap.arms.iter().map(|a| (a.alpha, a.beta)).collect();
        }
    }

    #[test]
    fn test_sink_failure_does_not_abort() {
        let config = RunConfig::simulation(vec![0.5, 0.5], 50)
            .with_snapshots([10, 20, 30])
            .validate()
            .unwrap();
        let sink = FnSink::new(|_: Snapshot| Err(SinkError::rejected("renderer crashed")));
        let mut driver = TrialDriver::new(&config, bernoulli, SeededRandom::new(8))
            .with_sink(sink);

        let report = driver.run().unwrap();

        assert_eq!(report.trials_executed, 50);
        assert_eq!(report.snapshots_emitted, 0);
        assert_eq!(report.snapshot_failures, 3);
        assert_eq!(driver.pool().total_observations(), 50.0);
    }

    #[test]
    fn test_cancel_stops_after_current_trial() {
        let config = RunConfig::simulation(vec![0.5, 0.7], 1000)
            .with_snapshots([4])
            .validate()
            .unwrap();
        let flag = CancelFlag::new();
        let trigger = flag.clone();
        let sink = FnSink::new(move |_: Snapshot| {
            trigger.cancel();
            Ok(())
        });
        let mut driver = TrialDriver::new(&config, bernoulli, SeededRandom::new(2))
            .with_sink(sink)
            .with_cancel_flag(flag);

        let report = driver.run().unwrap();

        assert!(report.cancelled);
        assert_eq!(report.trials_executed, 5);
        assert_eq!(driver.pool().total_observations(), 5.0);
        assert_eq!(driver.state(), DriverState::Completed);
    }

    #[test]
    fn test_driver_runs_once() {
        let config = RunConfig::simulation(vec![0.5], 3).validate().unwrap();
        let mut driver = TrialDriver::new(&config, bernoulli, SeededRandom::new(1));

        driver.run().unwrap();
        assert_eq!(
            driver.run().unwrap_err(),
            DriverError::NotIdle(DriverState::Completed)
        );
        assert_eq!(driver.pool().total_observations(), 3.0);
    }

    #[test]
    fn test_live_oracle_closure() {
        // Arm 1 always clicks, everything else never does
        let config = RunConfig::live(3, 300).validate().unwrap();
        let oracle = |arm: &Arm, _rng: &mut dyn RandomSource| arm.id() == ArmId(1);
        let mut driver = TrialDriver::new(&config, oracle, SeededRandom::new(4));

        let report = driver.run().unwrap();

        assert_eq!(driver.rank()[0].arm_id, ArmId(1));
        assert!(report.selections[1] > report.selections[0]);
        assert!(report.selections[1] > report.selections[2]);
        assert_eq!(driver.rank()[0].true_probability, None);
    }

    proptest! {
        #[test]
        fn prop_observations_equal_trials(
            probabilities in prop::collection::vec(0.0f64..=1.0, 1..6),
            trials in 0i64..300,
            seed in any::<u64>(),
        ) {
            let config = RunConfig::simulation(probabilities, trials).validate().unwrap();
            let mut driver = TrialDriver::new(&config, bernoulli, SeededRandom::new(seed));
            let report = driver.run().unwrap();

            prop_assert_eq!(report.trials_executed, trials as u64);
            prop_assert_eq!(report.selections.iter().sum::<u64>(), trials as u64);
            prop_assert_eq!(driver.pool().total_observations(), trials as f64);
            for arm in driver.pool().arms() {
                let idx = arm.id().index();
                prop_assert_eq!(arm.successes() as u64, report.successes[idx]);
                prop_assert_eq!(arm.trials_observed() as u64, report.selections[idx]);
            }
        }
    }
}
