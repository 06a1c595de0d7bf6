// argus_sim/src/prelude.rs

// Re-export the entire argus_core prelude so hosts can reach the pure
// sensor types directly.
pub use argus_core::prelude::*;

// Re-export common simulation-specific types for easy access.
pub use crate::error::SimError;
pub use crate::simulation::config::{
    load_scenario, load_scenario_str, AgentConfig, CameraConfig, ScenarioConfig, SensorConfig,
};
pub use crate::simulation::render::camera::PinholeCamera;
pub use crate::simulation::runner::{ObservationLog, SensorRecord, Simulation};
pub use crate::simulation::storage::{DirectoryFrameStore, PpmEncoder};
pub use crate::simulation::world::{Collider, SceneWorld, Shape};
