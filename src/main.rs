/*
 * Angiogenic Flocking Simulation
 *
 * Agents wander a bounded 3D volume under four forces: attraction to the
 * swarm center, a random walk, alignment with the closest neighbor and a
 * Lennard-Jones interaction. Each tick, a Notch/VEGFR/DLL4 exchange with
 * the closest neighbor decides how strongly an agent accelerates.
 *
 * Runs headless for a fixed number of ticks, or opens an interactive
 * viewer with live weight sliders and a signal plot.
 */

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use angioflock::driver;
use angioflock::{app, Flock, SimulationParams, Variant};

#[derive(Debug, Parser)]
#[command(name = "angioflock", version, about = "Flocking coupled to Notch/VEGFR/DLL4 signaling")]
struct Cli {
    /// Run without a window for a fixed number of ticks
    #[arg(long)]
    headless: bool,

    /// Ticks to run in headless mode
    #[arg(long, default_value_t = 1000)]
    ticks: u64,

    /// Update rule to use
    #[arg(long, value_enum)]
    variant: Option<Variant>,

    /// JSON file with parameter values; missing fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override a single parameter, e.g. `--set mutant=inhibited`
    #[arg(long = "set", value_name = "NAME=VALUE")]
    overrides: Vec<String>,

    /// Seed for initial placement and every per-tick random draw
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();
}

fn load_params(cli: &Cli) -> Result<SimulationParams> {
    let mut params = match &cli.config {
        Some(path) => SimulationParams::from_json_file(path)?,
        None => SimulationParams::default(),
    };
    for raw in &cli.overrides {
        params
            .apply_override(raw)
            .with_context(|| format!("invalid --set {raw}"))?;
    }
    if let Some(variant) = cli.variant {
        params.variant = variant;
    }
    if cli.seed.is_some() {
        params.seed = cli.seed;
    }
    params.validate().context("invalid simulation parameters")?;
    Ok(params)
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let params = load_params(&cli)?;

    let flock = Flock::new(params).context("failed to build flock")?;
    info!(
        agents = flock.len(),
        seed = flock.seed(),
        variant = ?flock.params().variant,
        mutant = ?flock.params().mutant,
        suppress_notch = flock.params().suppress_notch,
        boundary = flock.params().boundary,
        "flock initialized"
    );

    if cli.headless {
        let mut flock = flock;
        let series = driver::run_headless(&mut flock, cli.ticks).context("simulation halted")?;
        let (mean_notch, mean_vegfr) = flock.signal_means();
        info!(
            ticks = flock.tick(),
            samples = series.len(),
            mean_notch,
            mean_vegfr,
            collisions = flock.collisions().len(),
            "headless run finished"
        );
        Ok(())
    } else {
        app::run(flock)
    }
}
