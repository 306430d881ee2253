//! SimWorld - the simulation harness container.
//!
//! Wires a validated configuration to a trial driver, the run's random
//! source, the Bernoulli oracle and, when snapshots or a time limit are
//! configured, a tokio runtime hosting the snapshot recorder and the timer.
//! That runtime is the caller's when `run` is called from one.

use crate::error::SimError;
use crate::exporter::{drain_snapshots, record_snapshots};
use crate::oracle::BernoulliOracle;

use bandit_core::{CancelFlag, Pool, RunConfig, RunReport, TrialDriver, ValidatedConfig};
use bandit_env::{ChannelSink, EntropyRandom, RandomSource, SeededRandom, Snapshot};
use std::time::Duration;
use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, warn};

async fn cancel_after(limit: Duration, flag: CancelFlag) {
    tokio::time::sleep(limit).await;
    debug!("Time limit of {:?} reached", limit);
    flag.cancel();
}

/// Everything a finished simulation produced.
#[derive(Debug, Clone)]
pub struct SimRun {
    /// Scenario name
    pub name: String,
    
    /// Seed used, `None` for entropy-seeded runs
    pub seed: Option<u64>,
    
    /// Hidden probabilities, by arm index
    pub true_probabilities: Vec<f64>,
    
    /// Configured trial count
    pub trial_count: u64,
    
    pub report: RunReport,
    
    /// Final posteriors
    pub pool: Pool,
    
    /// Snapshots received by the recorder, in trial order
    pub frames: Vec<Snapshot>,
}

/// A single configured simulation.
#[derive(Debug, Clone)]
pub struct SimWorld {
    name: String,
    config: ValidatedConfig,
    time_limit: Option<Duration>,
}

impl SimWorld {
    /// Validates the configuration. Fails before any trial runs.
    pub fn new(name: &str, config: &RunConfig) -> Result<Self, SimError> {
        let config = config.validate()?;
        if config.true_probabilities().is_none() {
            return Err(SimError::MissingProbabilities);
        }
        
        Ok(Self {
            name: name.to_string(),
            config,
            time_limit: None,
        })
    }
    
    /// Stops scheduling trials once `limit` of wall-clock time has passed.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
    
    pub fn name(&self) -> &str {
        &self.name
    }
    
    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }
    
    fn random_source(&self) -> Box<dyn RandomSource> {
        match self.config.random_seed() {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => {
                warn!("No seed configured, run will not be reproducible");
                Box::new(EntropyRandom::new())
            }
        }
    }
    
    /// Runs the simulation to completion.
    ///
    /// Trials always run on the calling thread. The snapshot recorder and the
    /// time-limit timer go to the ambient tokio runtime when there is one,
    /// otherwise to a private single-worker runtime. Inside an async context
    /// prefer `spawn_blocking`, since the trial loop does not yield.
    pub fn run(&self) -> Result<SimRun, SimError> {
        let needs_runtime =
            !self.config.snapshot_trial_indices().is_empty() || self.time_limit.is_some();
        
        if !needs_runtime {
            let mut driver =
                TrialDriver::new(&self.config, BernoulliOracle::new(), self.random_source());
            let report = driver.run()?;
            return Ok(self.finish(report, driver.into_pool(), Vec::new()));
        }
        
        match Handle::try_current() {
            Ok(handle) => self.run_on(&handle),
            Err(_) => self.run_on_private_runtime(),
        }
    }
    
    /// Runs inside a runtime the caller owns; never blocks on it.
    fn run_on(&self, handle: &Handle) -> Result<SimRun, SimError> {
        let cancel = CancelFlag::new();
        let timer = match self.time_limit {
            // The timer task could only run once the trial loop gave the thread back
            Some(_) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
                return Err(SimError::TimerNeedsWorker);
            }
            Some(limit) => Some(handle.spawn(cancel_after(limit, cancel.clone()))),
            None => None,
        };
        
        // One slot per configured snapshot, so every frame stays buffered
        let (sink, mut rx) = ChannelSink::channel(self.config.snapshot_trial_indices().len());
        let mut driver = TrialDriver::new(&self.config, BernoulliOracle::new(), self.random_source())
            .with_sink(sink)
            .with_cancel_flag(cancel);
        let report = driver.run();
        
        if let Some(timer) = timer {
            timer.abort();
        }
        let report = report?;
        let pool = driver.into_pool();
        let frames = drain_snapshots(&mut rx);
        
        Ok(self.finish(report, pool, frames))
    }
    
    fn run_on_private_runtime(&self) -> Result<SimRun, SimError> {
        // Consumer and timer live on their own worker; trials stay on this thread
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()?;
        
        let cancel = CancelFlag::new();
        if let Some(limit) = self.time_limit {
            runtime.spawn(cancel_after(limit, cancel.clone()));
        }
        
        // One slot per configured snapshot, so a slow recorder never loses frames
        let (sink, rx) = ChannelSink::channel(self.config.snapshot_trial_indices().len());
        let recorder = runtime.spawn(record_snapshots(rx));
        
        let mut driver = TrialDriver::new(&self.config, BernoulliOracle::new(), self.random_source())
            .with_sink(sink)
            .with_cancel_flag(cancel);
        let report = driver.run()?;
        
        // Dropping the driver drops the sink and closes the channel
        let pool = driver.into_pool();
        let frames = runtime
            .block_on(recorder)
            .map_err(|e| SimError::Recorder(e.to_string()))?;
        debug!("Recorder returned {} frames", frames.len());
        
        Ok(self.finish(report, pool, frames))
    }
    
    fn finish(&self, report: RunReport, pool: Pool, frames: Vec<Snapshot>) -> SimRun {
        SimRun {
            name: self.name.clone(),
            seed: self.config.random_seed(),
            true_probabilities: self
                .config
                .true_probabilities()
                .map(<[f64]>::to_vec)
                .unwrap_or_default(),
            trial_count: self.config.trial_count(),
            report,
            pool,
            frames,
        }
    }
}
