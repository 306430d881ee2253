//! Bandit Simulator CLI
//!
//! Run seeded Thompson Sampling simulations over named or custom arm sets.

use bandit_core::RunConfig;
use bandit_sim::scenarios::ScenarioId;
use bandit_sim::{
    evaluate, time_limit_from_secs, ScenarioResult, ScenarioRunner, SimError, SimExport,
};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Bandit Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "bandit-sim")]
#[command(about = "Rank hidden-probability arms with Thompson Sampling", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of consecutive seeds to run
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Scenario to run (three_coins, close_race, single_arm, cold_start, ctr_catalogue, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Hidden probabilities for a custom run, comma-separated
    #[arg(short, long, value_delimiter = ',')]
    probabilities: Option<Vec<f64>>,

    /// Number of trials (overrides the scenario's)
    #[arg(short, long, allow_negative_numbers = true)]
    trials: Option<i64>,

    /// Trial indices to snapshot, comma-separated
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    snapshots: Vec<i64>,

    /// JSON run configuration file (custom run)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Wall-clock limit per run in seconds
    #[arg(long)]
    time_limit: Option<f64>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export snapshots and final ranking to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,
}

/// A named configuration to run for one seed.
struct Job {
    name: String,
    config: RunConfig,
}

fn load_config(path: &Path) -> Result<RunConfig, SimError> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Builds the jobs for one seed.
fn jobs_for_seed(
    args: &Args,
    runner: &ScenarioRunner,
    scenarios: &[ScenarioId],
    file_config: Option<&RunConfig>,
    seed: u64,
) -> Vec<Job> {
    if let Some(config) = file_config {
        // A seed in the file wins over the command line
        let mut config = config.clone();
        if config.random_seed.is_none() {
            config.random_seed = Some(seed);
        }
        return vec![Job { name: "custom".to_string(), config }];
    }

    if let Some(probabilities) = &args.probabilities {
        let trials = args.trials.unwrap_or(10_000);
        let config = RunConfig::simulation(probabilities.clone(), trials)
            .with_seed(seed)
            .with_snapshots(args.snapshots.iter().copied());
        return vec![Job { name: "custom".to_string(), config }];
    }

    scenarios
        .iter()
        .map(|scenario| Job {
            name: scenario.name().to_string(),
            config: runner.config_for(*scenario),
        })
        .collect()
}

/// Runs one job and writes its export.
fn export_run(runner: &ScenarioRunner, job: &Job, path: &Path) -> Result<ScenarioResult, SimError> {
    let run = runner.world(&job.name, &job.config)?.run()?;
    let result = evaluate(&run);
    SimExport::new(&run, &result).write_to_file(path)?;
    Ok(result)
}

fn log_result(result: &ScenarioResult) {
    let seed = result.seed.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
    if result.passed {
        info!("✓ {} (seed={}) PASSED", result.scenario, seed);
    } else {
        error!(
            "✗ {} (seed={}) FAILED: {}",
            result.scenario,
            seed,
            result.failure_reason.as_deref().unwrap_or("unknown")
        );
    }

    for arm in &result.ranking {
        let truth = arm
            .true_probability
            .map(|p| format!("{:.3}", p))
            .unwrap_or_else(|| "?".to_string());
        info!(
            "   #{} {} true={} alpha={} beta={} mean={:.4}",
            arm.rank, arm.arm_id, truth, arm.alpha, arm.beta, arm.posterior_mean
        );
    }
    info!(
        "   regret={:.1} best-arm share={:.1}%{}",
        result.metrics.cumulative_regret,
        result.metrics.best_arm_share * 100.0,
        if result.metrics.cancelled { " (cancelled)" } else { "" }
    );
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("Bandit Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!("Available scenarios: three_coins, close_race, single_arm, cold_start, ctr_catalogue, all");
            std::process::exit(1);
        })]
    };

    let file_config = match args.config.as_deref().map(load_config).transpose() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let time_limit = match args.time_limit.map(time_limit_from_secs).transpose() {
        Ok(limit) => limit,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64
    } else {
        args.seed
    };

    // Handle --export mode
    if let Some(export_path) = &args.export {
        let custom = file_config.is_some() || args.probabilities.is_some();
        if args.seeds > 1 || (!custom && scenarios.len() > 1) {
            eprintln!("Error: --export only supports a single run, not 'all' or multiple seeds");
            std::process::exit(1);
        }

        let runner = build_runner(&args, time_limit, base_seed);
        let jobs = jobs_for_seed(&args, &runner, &scenarios, file_config.as_ref(), base_seed);
        let Some(job) = jobs.first() else {
            eprintln!("Error: nothing to run");
            std::process::exit(1);
        };
        let outcome = export_run(&runner, job, export_path);

        match outcome {
            Ok(result) => {
                log_result(&result);
                info!("Exported to {}", export_path.display());
                if !result.passed {
                    std::process::exit(1);
                }
            }
            Err(e) => {
                error!("Export run failed: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Track results
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;
    let mut error_count = 0;

    // Run simulations
    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = build_runner(&args, time_limit, seed);

        for job in jobs_for_seed(&args, &runner, &scenarios, file_config.as_ref(), seed) {
            match runner.run_config(&job.name, &job.config) {
                Ok(result) => {
                    if !args.json {
                        log_result(&result);
                    }
                    if !result.passed {
                        failed_count += 1;
                    }
                    all_results.push(result);
                }
                Err(e) => {
                    error!("✗ {} (seed={}) ERROR: {}", job.name, seed, e);
                    error_count += 1;
                }
            }
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "errors": error_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario,
                    "seed": r.seed,
                    "passed": r.passed,
                    "trials": r.trials_executed,
                    "cumulative_regret": r.metrics.cumulative_regret,
                    "best_arm_share": r.metrics.best_arm_share,
                    "ranking": r.ranking,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to render summary: {}", e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 && error_count == 0 {
            info!("✅ All {} runs passed!", total);
        } else {
            error!("❌ {}/{} runs failed, {} errors", failed_count, total, error_count);

            for result in all_results.iter().filter(|r| !r.passed) {
                error!(
                    "  - {} seed={:?}: {}",
                    result.scenario,
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 || error_count > 0 {
        std::process::exit(1);
    }
}

fn build_runner(args: &Args, time_limit: Option<Duration>, seed: u64) -> ScenarioRunner {
    let mut runner = ScenarioRunner::new(seed).with_snapshots(args.snapshots.clone());
    if let Some(trials) = args.trials {
        runner = runner.with_trials(trials);
    }
    if let Some(limit) = time_limit {
        runner = runner.with_time_limit(limit);
    }
    runner
}
