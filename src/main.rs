use bodysim::{bench_gravity, bench_ticks};
use bodysim::{LogSink, Scenario, ScenarioConfig, Scheduler, TrajectoryRecorder};

use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "simple.yaml")]
    file_name: String,

    /// Wall-clock seconds to run before requesting shutdown
    #[arg(long, default_value_t = 10.0)]
    seconds: f64,

    /// Run throughput benches instead of a scenario
    #[arg(long)]
    bench: bool,
}

/// Resolve a scenario file under `scenarios/` and parse it.
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("scenarios")
        .join(file_name);
    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig =
        serde_yaml::from_reader(reader).context("failed to parse scenario YAML")?;

    Ok(scenario_cfg)
}

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();

    if args.bench {
        bench_gravity();
        bench_ticks();
        return Ok(());
    }

    let scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    let scenario = Scenario::build_scenario(scenario_cfg)?;

    let config = scenario.config.clone();
    let scheduler = Scheduler::new(scenario.system, scenario.integrator, scenario.config)
        .with_per_iteration_sink(LogSink)
        .with_per_tick_sink(TrajectoryRecorder::new(scenario.trajectory_fade_out_count));

    let handle = scheduler.spawn()?;

    // The main thread plays the control surface: let the simulation run for
    // the requested wall-clock time, then request cooperative shutdown
    thread::sleep(Duration::from_secs_f64(args.seconds.max(0.0)));
    config.stop();

    handle
        .join()
        .map_err(|_| anyhow::anyhow!("scheduler thread panicked"))?
}
