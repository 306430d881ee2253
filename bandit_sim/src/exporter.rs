//! Snapshot recording and JSON export.
//!
//! The recorder is the consumer side of the snapshot boundary: it runs as a
//! tokio task and drains the channel the driver hands snapshots to. The
//! export bundles the recorded frames with the final ranking for external
//! plotting tools.

use crate::oracle::cumulative_regret;
use crate::runner::ScenarioResult;
use crate::world::SimRun;

use bandit_core::{rank, RankedArm};
use bandit_env::{ArmId, Snapshot};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

/// Drains snapshots until every sender is gone.
pub async fn record_snapshots(mut rx: mpsc::Receiver<Snapshot>) -> Vec<Snapshot> {
    let mut frames = Vec::new();
    while let Some(snapshot) = rx.recv().await {
        debug!(
            "Recorded snapshot at trial {} ({} observations)",
            snapshot.trial_index,
            snapshot.observations()
        );
        frames.push(snapshot);
    }
    frames
}

/// Takes whatever is buffered without waiting. Used when the caller already
/// runs on a tokio runtime and cannot block on the recorder task.
pub fn drain_snapshots(rx: &mut mpsc::Receiver<Snapshot>) -> Vec<Snapshot> {
    let mut frames = Vec::new();
    while let Ok(snapshot) = rx.try_recv() {
        frames.push(snapshot);
    }
    debug!("Drained {} buffered snapshots", frames.len());
    frames
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Unique id of this export
    pub run_id: Uuid,
    
    /// Scenario name
    pub scenario: String,
    
    /// Seed used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    
    /// Configured trials
    pub trial_count: u64,
    
    /// Trials actually run (lower if cancelled)
    pub trials_executed: u64,
    
    /// Recorded snapshots
    pub frames: Vec<Snapshot>,
    
    /// Final ranking by posterior mean
    pub ranking: Vec<RankedArm>,
    
    /// Arm ranked first
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_arm: Option<ArmId>,
    
    /// Scenario check result
    pub passed: bool,
    
    /// Expected regret of the plays made
    pub cumulative_regret: f64,
}

impl SimExport {
    /// Builds an export from a finished run and its evaluation.
    pub fn new(run: &SimRun, result: &ScenarioResult) -> Self {
        let ranking = rank(&run.pool);
        Self {
            run_id: Uuid::new_v4(),
            scenario: run.name.clone(),
            seed: run.seed,
            trial_count: run.trial_count,
            trials_executed: run.report.trials_executed,
            frames: run.frames.clone(),
            best_arm: ranking.first().map(|r| r.arm_id),
            ranking,
            passed: result.passed,
            cumulative_regret: cumulative_regret(&run.true_probabilities, &run.report.selections),
        }
    }
    
    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::evaluate;
    use crate::world::SimWorld;
    use bandit_core::RunConfig;
    use bandit_env::{ChannelSink, SnapshotSink};
    
    #[tokio::test]
    async fn test_record_snapshots_until_closed() {
        let (mut sink, rx) = ChannelSink::channel(8);
        let recorder = tokio::spawn(record_snapshots(rx));
        
        for i in 0..3 {
            sink.emit(Snapshot::new(i, vec![])).unwrap();
        }
        drop(sink);
        
        let frames = recorder.await.unwrap();
        let indices: Vec<u64> = frames.iter().map(|f| f.trial_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }
    
    #[test]
    fn test_export_round_trips_through_file() {
        let config = RunConfig::simulation(vec![0.1, 0.9], 400)
            .with_seed(5)
            .with_snapshots([0, 399]);
        let run = SimWorld::new("export", &config).unwrap().run().unwrap();
        let result = evaluate(&run);
        let export = SimExport::new(&run, &result);
        
        let path = std::env::temp_dir().join(format!("bandit_export_{}.json", export.run_id));
        export.write_to_file(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        
        let loaded: SimExport = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded.run_id, export.run_id);
        assert_eq!(loaded.frames.len(), 2);
        assert_eq!(loaded.ranking.len(), 2);
        assert_eq!(loaded.best_arm, Some(ArmId(1)));
        assert!(loaded.passed);
        assert!(loaded.cumulative_regret >= 0.0);
    }
}
