// argus_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Argus: runs perception sensors over a scripted scene and dumps the
/// observation vectors a learning agent would receive.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to run.
    #[arg(short, long, default_value = "assets/scenarios/showcase.toml")]
    pub scenario: PathBuf,

    /// Overrides `simulation.ticks` from the scenario.
    #[arg(long)]
    pub ticks: Option<u32>,

    /// Where to write the observation dump (TOML). Overrides `simulation.output`.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for pixel sensor snapshots. Overrides `simulation.snapshot_dir`.
    #[arg(long)]
    pub snapshot_dir: Option<PathBuf>,

    /// Default log filter, used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
