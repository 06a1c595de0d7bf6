// argus_sim/src/simulation/config/structs.rs

use std::path::PathBuf;

use argus_core::prelude::{GridSensorConfig, PixelSensorConfig, RaySensorConfig, SensorPose};
use serde::Deserialize;

// =========================================================================
// == Top-Level Configuration ==
// =========================================================================

/// # ScenarioConfig
/// The root of the data parsed from a `scenario.toml` file.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)] // Fail if the TOML has fields not in our struct
pub struct ScenarioConfig {
    #[serde(default)] // Use default if the [simulation] section is missing
    pub simulation: Simulation,

    #[serde(default)]
    pub world: World,

    // The TOML has `[[cameras]]`, which becomes a Vec of CameraConfig structs.
    #[serde(default)]
    pub cameras: Vec<CameraConfig>,

    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

// =========================================================================
// == Configuration Sub-Structs ==
// =========================================================================

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Simulation {
    /// Optional seed for the obstacle scatter. Unseeded runs draw from entropy.
    pub seed: Option<u64>,
    /// Number of sensor passes to run.
    pub ticks: u32,
    /// Seconds of simulated time between passes.
    pub dt: f32,
    /// Where to write the observation dump. Nothing is written when unset.
    pub output: Option<PathBuf>,
    /// Where pixel sensors with `snapshot = true` write their final frame.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            ticks: 1,
            dt: 0.1,
            output: None,
            snapshot_dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct World {
    pub obstacles: Vec<ObstacleConfig>,
    pub scatter: Option<ScatterConfig>,
    /// Colour rendered where a camera ray hits nothing.
    pub background: [f32; 3],
}

impl Default for World {
    fn default() -> Self {
        Self {
            obstacles: Vec::new(),
            scatter: None,
            background: [0.1, 0.1, 0.15],
        }
    }
}

fn default_tag() -> String {
    "Untagged".to_string()
}

fn default_color() -> [f32; 3] {
    [0.6, 0.6, 0.6]
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ObstacleConfig {
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Physics layer in `0..32`, matched against each sensor's collision mask.
    #[serde(default)]
    pub layer: u8,
    #[serde(default = "default_color")]
    pub color: [f32; 3],
    pub shape: ShapeConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum ShapeConfig {
    Sphere {
        center: [f32; 3],
        radius: f32,
    },
    /// An axis-aligned box.
    Cuboid {
        center: [f32; 3],
        half_extents: [f32; 3],
    },
}

/// Randomly placed spheres, drawn from a seeded generator.
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ScatterConfig {
    pub count: u32,
    /// Each obstacle takes one of these tags, chosen uniformly.
    pub tags: Vec<String>,
    /// Half size of the region, centred on the origin.
    pub extent: [f32; 3],
    /// Inclusive `[min, max]` radius.
    #[serde(default = "default_radius_range")]
    pub radius_range: [f32; 2],
    #[serde(default)]
    pub layer: u8,
}

fn default_radius_range() -> [f32; 2] {
    [0.5, 1.5]
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    pub name: String,
    /// World pose, or the offset from the followed agent when `follow` is set.
    #[serde(default)]
    pub pose: SensorPose,
    /// Full vertical field of view in degrees.
    #[serde(default = "default_vertical_fov")]
    pub vertical_fov: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Name of an agent this camera rides on.
    pub follow: Option<String>,
}

fn default_vertical_fov() -> f32 {
    60.0
}

fn default_far() -> f32 {
    100.0
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    pub name: String,
    #[serde(default)]
    pub pose: SensorPose,
    /// World-frame velocity in m/s.
    #[serde(default)]
    pub velocity: [f32; 3],
    /// Turn rate about the agent's own up axis, in degrees per second.
    #[serde(default)]
    pub yaw_rate: f32,
    #[serde(default)]
    pub sensors: Vec<SensorConfig>,
}

/// One sensor mounted on an agent, tagged by `kind` in the TOML.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "kind", deny_unknown_fields)]
pub enum SensorConfig {
    Ray {
        name: String,
        /// Log every trace through the debug hook.
        #[serde(default)]
        debug: bool,
        #[serde(default)]
        config: RaySensorConfig,
    },
    Grid {
        name: String,
        #[serde(default)]
        debug: bool,
        #[serde(default)]
        config: GridSensorConfig,
    },
    Pixel {
        name: String,
        /// Name of a `[[cameras]]` entry. A pixel sensor without one reports
        /// a missing-camera error on every pass.
        camera: Option<String>,
        /// Write the final frame to `simulation.snapshot_dir`.
        #[serde(default)]
        snapshot: bool,
        #[serde(default)]
        config: PixelSensorConfig,
    },
}

impl SensorConfig {
    pub fn name(&self) -> &str {
        match self {
            SensorConfig::Ray { name, .. }
            | SensorConfig::Grid { name, .. }
            | SensorConfig::Pixel { name, .. } => name,
        }
    }
}
