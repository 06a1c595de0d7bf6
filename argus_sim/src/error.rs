// argus_sim/src/error.rs

use std::path::PathBuf;

use argus_core::error::SensorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("scenario file not found at {0:?}")]
    ScenarioNotFound(PathBuf),

    #[error("failed to load or parse scenario: {0}")]
    Config(#[from] figment::Error),

    #[error("sensor '{sensor}' on agent '{agent}': {source}")]
    Sensor {
        agent: String,
        sensor: String,
        #[source]
        source: SensorError,
    },

    #[error("camera '{0}' is not defined in the scenario")]
    UnknownCamera(String),

    #[error("agent '{0}' is not defined in the scenario")]
    UnknownAgent(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to serialize observations: {0}")]
    Serialize(#[from] toml::ser::Error),
}
