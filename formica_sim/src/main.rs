//! Formica Simulator CLI
//!
//! Run colony scenarios with invariant checks, or record a colony to JSON.

use clap::Parser;
use formica_sim::scenarios::ScenarioId;
use formica_sim::{ScenarioResult, ScenarioRunner, SimConfig, SimError, Simulator};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Formica ant colony simulator
#[derive(Parser, Debug)]
#[command(name = "formica-sim")]
#[command(about = "Run deterministic ant colony simulations", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Number of ants (overrides the config file)
    #[arg(short, long)]
    ants: Option<usize>,

    /// Scenario to run (random_colony, head_on, boundary_crossing, trail_follow, dense_swarm, live_reconfigure, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Simulated duration in seconds (overrides the config file)
    #[arg(short, long)]
    duration: Option<f64>,

    /// JSON run configuration (world, ant parameters, counts)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON live parameter file applied before recording
    #[arg(short, long)]
    params: Option<PathBuf>,

    /// Record the configured colony to this JSON file instead of running scenarios
    #[arg(long)]
    export: Option<PathBuf>,

    /// Ticks between recorded frames (overrides the config file)
    #[arg(long)]
    record_step: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,
}

impl Args {
    /// File config (or defaults) with CLI overrides applied.
    fn sim_config(&self, seed: u64) -> Result<SimConfig, SimError> {
        let mut config = match &self.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        config.seed = seed;
        if let Some(ants) = self.ants {
            config.ant_count = ants;
        }
        if let Some(duration) = self.duration {
            config.duration_secs = duration;
        }
        if let Some(step) = self.record_step {
            config.record_step = step;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Records the configured colony and writes it to `path`.
fn run_with_export(config: SimConfig, params: Option<&PathBuf>, path: &PathBuf) -> Result<usize, SimError> {
    let duration = config.duration_secs;
    let step = config.record_step;
    let mut sim = Simulator::new(config)?;
    if let Some(params) = params {
        let changed = sim.reload_params(params)?;
        info!("Applied {} to {} ants", params.display(), changed);
    }
    let recording = sim.record(duration, step)?;
    recording.write_to_file(path)?;
    Ok(recording.frames.len())
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    if !args.json {
        info!("Formica Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    let config = args.sim_config(base_seed).unwrap_or_else(|e| {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    // Handle --export mode for recording
    if let Some(export_path) = &args.export {
        info!("Recording {} ants for {}s to {}", config.ant_count, config.duration_secs, export_path.display());
        match run_with_export(config, args.params.as_ref(), export_path) {
            Ok(frames) => {
                info!("✓ Exported {} frames to {}", frames, export_path.display());
                return;
            }
            Err(e) => {
                error!("✗ Recording failed: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!(
                "Available scenarios: {}, all",
                ScenarioId::all().iter().map(ScenarioId::name).collect::<Vec<_>>().join(", ")
            );
            std::process::exit(1);
        })]
    };

    // Track results
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    // Run simulations
    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);

        let runner = ScenarioRunner::new(seed, config.ant_count)
            .with_duration(config.duration_secs)
            .with_world(config.world.clone());

        for scenario in &scenarios {
            let result = runner.run(*scenario);

            if !args.json {
                if result.passed {
                    info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }

            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        // JSON output for CI parsing
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "ticks": r.total_ticks,
                    "time_secs": r.final_time_secs,
                    "ants": r.final_ant_count,
                    "metrics": r.metrics,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to encode summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);

            // List failed seeds
            for result in &all_results {
                if !result.passed {
                    error!(
                        "  - {} seed={}: {}",
                        result.scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        std::process::exit(1);
    }
}
