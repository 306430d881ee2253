//! Scenario runner - executes simulation scenarios and checks their outcome.

use crate::error::SimError;
use crate::oracle::cumulative_regret;
use crate::scenarios::ScenarioId;
use crate::world::{SimRun, SimWorld};

use bandit_core::{rank, RankedArm, RunConfig};
use std::time::Duration;
use tracing::{debug, info};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: String,

    /// Seed used
    pub seed: Option<u64>,

    /// Whether the scenario check held
    pub passed: bool,

    /// Trials actually executed
    pub trials_executed: u64,

    /// Final ranking by posterior mean
    pub ranking: Vec<RankedArm>,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetrics {
    /// Expected regret of the plays made against always playing the best arm
    pub cumulative_regret: f64,

    /// Fraction of trials spent on the best arm
    pub best_arm_share: f64,

    /// Snapshots delivered to the recorder
    pub snapshots_emitted: u64,

    /// Snapshots the sink refused
    pub snapshot_failures: u64,

    /// Run was stopped by its time limit
    pub cancelled: bool,
}

/// Convergence over repeated seeded runs of one scenario.
#[derive(Debug, Clone)]
pub struct ConvergenceReport {
    pub scenario: String,

    /// Number of runs
    pub runs: usize,

    /// Runs that ranked the best arm first
    pub best_ranked_first: usize,

    /// Mean cumulative regret across runs
    pub mean_regret: f64,
}

impl ConvergenceReport {
    /// Fraction of runs that ranked the best arm first.
    pub fn rate(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.best_ranked_first as f64 / self.runs as f64
    }
}

/// Converts a wall-clock limit in seconds, rejecting negative, NaN and
/// values too large for a [`Duration`].
pub fn time_limit_from_secs(secs: f64) -> Result<Duration, SimError> {
    Duration::try_from_secs_f64(secs).map_err(|_| SimError::InvalidTimeLimit(secs))
}

/// Checks a finished run and collects its metrics.
///
/// - no trials configured: every arm sits at the prior mean, in ascending id order
/// - cancelled before the first trial: not evaluated, reported as failed
/// - one arm: it was selected on every trial
/// - otherwise: an arm with the highest hidden probability ranks first
pub fn evaluate(run: &SimRun) -> ScenarioResult {
    let ranking = rank(&run.pool);
    let report = &run.report;
    let best_p = run.true_probabilities.iter().cloned().fold(0.0, f64::max);

    let failure_reason = if run.trial_count == 0 {
        let in_order = ranking.iter().enumerate().all(|(i, r)| r.arm_id.index() == i);
        let at_prior = ranking.iter().all(|r| r.posterior_mean == 0.5);
        if in_order && at_prior {
            None
        } else {
            Some("Ranking moved away from priors without trials".to_string())
        }
    } else if report.trials_executed == 0 {
        Some(format!(
            "Not evaluated: stopped before the first of {} trials",
            run.trial_count
        ))
    } else if run.pool.len() == 1 {
        if report.selections.first().copied() == Some(report.trials_executed) {
            None
        } else {
            Some(format!(
                "Single arm selected {:?} times over {} trials",
                report.selections.first(),
                report.trials_executed
            ))
        }
    } else {
        match ranking.first() {
            Some(top) if top.true_probability == Some(best_p) => None,
            Some(top) => Some(format!(
                "{} ranked first with p={:.3}, best is p={:.3}",
                top.arm_id,
                top.true_probability.unwrap_or(f64::NAN),
                best_p
            )),
            None => Some("Empty ranking".to_string()),
        }
    };

    let best_plays: u64 = run
        .true_probabilities
        .iter()
        .zip(&report.selections)
        .filter(|(p, _)| **p == best_p)
        .map(|(_, &n)| n)
        .sum();
    let best_arm_share = if report.trials_executed > 0 {
        best_plays as f64 / report.trials_executed as f64
    } else {
        0.0
    };

    ScenarioResult {
        scenario: run.name.clone(),
        seed: run.seed,
        passed: failure_reason.is_none(),
        trials_executed: report.trials_executed,
        ranking,
        failure_reason,
        metrics: ScenarioMetrics {
            cumulative_regret: cumulative_regret(&run.true_probabilities, &report.selections),
            best_arm_share,
            snapshots_emitted: report.snapshots_emitted,
            snapshot_failures: report.snapshot_failures,
            cancelled: report.cancelled,
        },
    }
}

/// Runs simulation scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Overrides the scenario's trial count
    trials: Option<i64>,

    /// Overrides the scenario's hidden probabilities
    probabilities: Option<Vec<f64>>,

    /// Trials after which snapshots are recorded
    snapshots: Vec<i64>,

    /// Wall-clock limit per run
    time_limit: Option<Duration>,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            trials: None,
            probabilities: None,
            snapshots: Vec::new(),
            time_limit: None,
        }
    }

    /// Sets the trial count.
    pub fn with_trials(mut self, trials: i64) -> Self {
        self.trials = Some(trials);
        self
    }

    /// Sets the hidden probabilities.
    pub fn with_probabilities(mut self, probabilities: Vec<f64>) -> Self {
        self.probabilities = Some(probabilities);
        self
    }

    /// Sets the snapshot trial indices.
    pub fn with_snapshots(mut self, indices: Vec<i64>) -> Self {
        self.snapshots = indices;
        self
    }

    /// Sets the wall-clock limit per run.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Configuration for a scenario with this runner's overrides applied.
    pub fn config_for(&self, scenario: ScenarioId) -> RunConfig {
        let probabilities = self
            .probabilities
            .clone()
            .unwrap_or_else(|| scenario.true_probabilities());
        let trials = self.trials.unwrap_or_else(|| scenario.trial_count());

        RunConfig::simulation(probabilities, trials)
            .with_seed(self.seed)
            .with_snapshots(self.snapshots.iter().copied())
    }

    /// Builds the world for a named configuration.
    pub fn world(&self, name: &str, config: &RunConfig) -> Result<SimWorld, SimError> {
        let world = SimWorld::new(name, config)?;
        Ok(match self.time_limit {
            Some(limit) => world.with_time_limit(limit),
            None => world,
        })
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> Result<ScenarioResult, SimError> {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);
        debug!("  {}", scenario.description());

        self.run_config(scenario.name(), &self.config_for(scenario))
    }

    /// Runs an arbitrary configuration under the given name.
    pub fn run_config(&self, name: &str, config: &RunConfig) -> Result<ScenarioResult, SimError> {
        let run = self.world(name, config)?.run()?;
        let result = evaluate(&run);

        debug!(
            "  {}: {} trials, regret={:.1}, best arm share={:.1}%",
            name,
            result.trials_executed,
            result.metrics.cumulative_regret,
            result.metrics.best_arm_share * 100.0
        );

        Ok(result)
    }

    /// Repeats a scenario over consecutive seeds starting at this runner's.
    pub fn convergence(
        &self,
        scenario: ScenarioId,
        repetitions: usize,
    ) -> Result<ConvergenceReport, SimError> {
        let mut best_ranked_first = 0;
        let mut total_regret = 0.0;

        for offset in 0..repetitions {
            let config = self
                .config_for(scenario)
                .with_seed(self.seed.wrapping_add(offset as u64));
            let result = self.run_config(scenario.name(), &config)?;

            if result.passed {
                best_ranked_first += 1;
            }
            total_regret += result.metrics.cumulative_regret;
        }

        let report = ConvergenceReport {
            scenario: scenario.name().to_string(),
            runs: repetitions,
            best_ranked_first,
            mean_regret: if repetitions > 0 {
                total_regret / repetitions as f64
            } else {
                0.0
            },
        };

        info!(
            "Convergence {}: {}/{} runs ranked the best arm first ({:.1}%)",
            report.scenario,
            report.best_ranked_first,
            report.runs,
            report.rate() * 100.0
        );

        Ok(report)
    }
}
