// argus_sim/src/lib.rs

//! A headless host for the `argus_core` sensors.
//!
//! It supplies everything the core treats as external: an analytic collider
//! scene answering casts and overlap queries, a software renderer for pixel
//! sensors, and file storage for snapshots.

use std::fs;

use tracing::info;

// This prelude is for convenience for other files WITHIN the argus_sim crate.
pub mod prelude;

pub mod cli;
pub mod error;
pub mod simulation;

use crate::cli::Cli;
use crate::error::SimError;
use crate::simulation::config::load_scenario;
use crate::simulation::runner::{ObservationLog, Simulation};

/// Loads the scenario named on the command line, runs it and writes the
/// observation dump if an output path is configured.
pub fn run(cli: &Cli) -> Result<ObservationLog, SimError> {
    info!("Loading scenario from: {:?}", cli.scenario);
    let mut scenario = load_scenario(&cli.scenario)?;

    if let Some(ticks) = cli.ticks {
        scenario.simulation.ticks = ticks;
    }
    if let Some(output) = &cli.output {
        scenario.simulation.output = Some(output.clone());
    }
    if let Some(dir) = &cli.snapshot_dir {
        scenario.simulation.snapshot_dir = Some(dir.clone());
    }

    let output = scenario.simulation.output.clone();
    let mut simulation = Simulation::from_config(scenario)?;
    let log = simulation.run()?;

    if let Some(path) = output {
        fs::write(&path, log.to_toml()?)?;
        info!("Wrote {} ticks of observations to {:?}", log.ticks.len(), path);
    }
    Ok(log)
}
