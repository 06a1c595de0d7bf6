// argus_sim/src/simulation/config/mod.rs

//! Loading and validation of scenario files.
//!
//! A scenario is a TOML file layered with `ARGUS_`-prefixed environment
//! variables, where `__` separates nested keys
//! (`ARGUS_SIMULATION__TICKS=20` overrides `simulation.ticks`).

pub mod structs;

use std::path::Path;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use tracing::debug;

use crate::error::SimError;
pub use structs::{AgentConfig, CameraConfig, ScenarioConfig, SensorConfig};

pub const ENV_PREFIX: &str = "ARGUS_";

/// Loads the scenario at `path`, with environment overrides applied on top.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, SimError> {
    // Figment treats a missing file as an empty one.
    if !path.is_file() {
        return Err(SimError::ScenarioNotFound(path.to_path_buf()));
    }

    let scenario: ScenarioConfig = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;

    debug!(
        "Loaded scenario with {} agents and {} cameras",
        scenario.agents.len(),
        scenario.cameras.len()
    );
    Ok(scenario)
}

/// Parses a scenario from TOML text. No environment overrides are applied.
pub fn load_scenario_str(toml: &str) -> Result<ScenarioConfig, SimError> {
    Ok(Figment::new().merge(Toml::string(toml)).extract()?)
}
