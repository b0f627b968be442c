#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line driver for Platform Grid.
//!
//! Runs a fixed-step session with a scripted player that keeps walking onto
//! the newest platform, prints every lifecycle event and finishes with the
//! outcome counters.

mod report;
mod walker;

use std::{fs, path::PathBuf};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use glam::Vec2;
use platform_grid_core::{Event, GridConfig, NeighborOrder};
use platform_grid_orchestrator::Orchestrator;
use platform_grid_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::walker::{newest_cell, Walker};

#[derive(Debug, Parser)]
#[command(name = "platform-grid")]
#[command(about = "Run a headless Platform Grid session")]
struct Args {
    /// TOML file with grid settings; missing keys fall back to defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Simulated seconds to run
    #[arg(long, default_value_t = 30.0)]
    duration: f32,
    /// Fixed time step in seconds
    #[arg(long, default_value_t = 0.1)]
    step: f32,
    /// Reset the session once this many seconds have elapsed
    #[arg(long)]
    reset_at: Option<f32>,
    /// Override the random seed
    #[arg(long)]
    seed: Option<u64>,
    /// Override the active cell ceiling
    #[arg(long)]
    max_active: Option<usize>,
    /// Override the initial fill count
    #[arg(long)]
    fill: Option<usize>,
    /// Shuffle neighbor candidates instead of using the fixed priority
    #[arg(long)]
    shuffled: bool,
    /// Only print the final summary
    #[arg(long)]
    quiet_events: bool,
}

fn load_config(args: &Args) -> Result<GridConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GridConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(max_active) = args.max_active {
        config.max_active_cells = max_active;
    }
    if let Some(fill) = args.fill {
        config.initial_fill_count = fill;
    }
    if args.shuffled {
        config.neighbor_order = NeighborOrder::Shuffled;
    }
    Ok(config)
}

fn print_events(clock: f32, events: &mut Vec<Event>, quiet: bool) {
    for event in events.drain(..) {
        if quiet {
            continue;
        }
        if let Some(line) = report::describe(&event) {
            println!("[{clock:>8.2}s] {line}");
        }
    }
}

fn run(args: &Args, config: GridConfig) -> Result<()> {
    let config = config.validate().context("invalid grid configuration")?;
    let geometry = config.geometry();
    let speed = config.movement_speed();
    let fill = config.initial_fill_count();

    let mut orchestrator = Orchestrator::new(config);
    let mut events = Vec::new();
    orchestrator
        .initialize(Vec2::ZERO, fill, &mut events)
        .context("failed to start session")?;
    print_events(0.0, &mut events, args.quiet_events);

    let mut walker = Walker::new(Vec2::ZERO, speed);
    let mut reset_at = args.reset_at;
    let steps = (args.duration / args.step).ceil() as u64;
    info!(steps, step_secs = args.step, "headless run starting");
    for index in 1..=steps {
        let clock = index as f32 * args.step;
        orchestrator.advance(args.step, &mut events)?;

        let target = newest_cell(orchestrator.world(), &geometry);
        let position = walker.step(target, args.step);
        orchestrator.report_player_position(position, &mut events)?;

        if reset_at.is_some_and(|at| clock >= at) {
            reset_at = None;
            orchestrator.reset(&mut events)?;
            walker = Walker::new(Vec2::ZERO, speed);
        }

        print_events(clock, &mut events, args.quiet_events);
    }

    info!(
        active = query::active_count(orchestrator.world()),
        "headless run finished"
    );
    println!("{}", orchestrator.stats());
    Ok(())
}

/// Entry point for the Platform Grid command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    ensure!(
        args.step.is_finite() && args.step > 0.0,
        "--step must be a positive number of seconds"
    );
    ensure!(
        args.duration.is_finite() && args.duration >= 0.0,
        "--duration must be a non-negative number of seconds"
    );

    let config = load_config(&args)?;
    run(&args, config)
}
