//! Cools a cup of coffee.
//!
//! Generates the cup point cloud, runs the conduction solver for the
//! configured duration and optionally writes the final state to VTK.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use cupheat::config::SimulationConfig;
use cupheat::io::save_vtk;
use cupheat::{HeatSolver, LogObserver, MaterialType, generate_cup};

/// Point-cloud heat diffusion in a cup of coffee
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to a JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override simulated time (s)
    #[arg(long)]
    duration: Option<f64>,

    /// Override time step (s)
    #[arg(long)]
    time_step: Option<f64>,

    /// Override point spacing (m)
    #[arg(long)]
    spacing: Option<f64>,

    /// Write the final state to this VTK file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log progress every N steps
    #[arg(long, default_value_t = 100)]
    report_every: u64,
}

fn load_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(duration) = args.duration {
        config.solver.duration = duration;
    }
    if let Some(time_step) = args.time_step {
        config.solver.time_step = time_step;
    }
    if let Some(spacing) = args.spacing {
        config.cup.point_spacing = spacing;
    }
    config.validate().context("Invalid simulation configuration")?;
    Ok(config)
}

fn log_averages(solver: &HeatSolver) {
    for material in MaterialType::ALL {
        info!(
            "  {:<6} {:.2} K",
            material.name(),
            solver.average_temperature(material)
        );
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let cloud = generate_cup(&config.cup)?;
    info!("Generated cup with {} points", cloud.len());

    let mut solver = HeatSolver::with_material_table(
        cloud,
        config.materials.to_table()?,
        config.solver.time_step,
        config.discretization()?,
    )?;
    solver.set_observer(Box::new(LogObserver::new(args.report_every)));

    let dt_max = solver.max_stable_time_step()?;
    info!(
        "Time step {} s (stability bound {:.4} s)",
        config.solver.time_step, dt_max
    );

    info!("Initial average temperatures:");
    log_averages(&solver);

    let start = Instant::now();
    let steps = solver.run_for_duration(config.solver.duration)?;
    info!(
        "Ran {} steps to t={:.3} s in {:.2?}",
        steps,
        solver.current_time(),
        start.elapsed()
    );

    info!("Final average temperatures:");
    log_averages(&solver);

    if let Some(path) = &args.output {
        save_vtk(solver.cloud(), path)?;
        info!("Saved {}", path.display());
    }

    Ok(())
}
