// argus_sim/src/simulation/runner.rs

//! Ticks agents through the scene, samples every mounted sensor and records
//! the observation vectors each pass produced.

use std::collections::HashMap;
use std::path::PathBuf;

use argus_core::prelude::{
    CameraHandle, GridSensor, PixelSensor, RaySensor, Sensor, SensorError, SensorPose,
};
use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::SimError;
use crate::simulation::config::structs::{AgentConfig, CameraConfig, ScenarioConfig, SensorConfig};
use crate::simulation::debugging::TracingDebugHook;
use crate::simulation::render::camera::PinholeCamera;
use crate::simulation::storage::{DirectoryFrameStore, PpmEncoder};
use crate::simulation::world::{spawner::build_world, SceneWorld};

// =========================================================================
// == Mounted Sensors ==
// =========================================================================

#[derive(Debug, Clone)]
pub enum SensorKind {
    Ray(RaySensor),
    Grid(GridSensor),
    Pixel(PixelSensor),
}

/// A sensor attached to an agent, with the bookkeeping the runner needs.
#[derive(Debug, Clone)]
pub struct MountedSensor {
    pub name: String,
    pub kind: SensorKind,
    snapshot: bool,
    failing: bool,
}

impl MountedSensor {
    fn from_config(
        config: &SensorConfig,
        agent: &str,
        cameras: &HashMap<String, CameraHandle>,
    ) -> Result<Self, SimError> {
        let name = config.name().to_string();
        let mut snapshot = false;
        let built = match config {
            SensorConfig::Ray { debug, config, .. } => RaySensor::new(config.clone()).map(|s| {
                if *debug {
                    SensorKind::Ray(s.with_debug_hook(Box::new(TracingDebugHook::new(&name))))
                } else {
                    SensorKind::Ray(s)
                }
            }),
            SensorConfig::Grid { debug, config, .. } => GridSensor::new(config.clone()).map(|s| {
                if *debug {
                    SensorKind::Grid(s.with_debug_hook(Box::new(TracingDebugHook::new(&name))))
                } else {
                    SensorKind::Grid(s)
                }
            }),
            SensorConfig::Pixel {
                camera,
                snapshot: wants_snapshot,
                config,
                ..
            } => {
                let handle = match camera {
                    Some(camera) => Some(
                        *cameras
                            .get(camera)
                            .ok_or_else(|| SimError::UnknownCamera(camera.clone()))?,
                    ),
                    None => None,
                };
                snapshot = *wants_snapshot;
                PixelSensor::new(config.clone(), handle).map(SensorKind::Pixel)
            }
        };

        let kind = built.map_err(|source| SimError::Sensor {
            agent: agent.to_string(),
            sensor: name.clone(),
            source,
        })?;
        Ok(Self {
            name,
            kind,
            snapshot,
            failing: false,
        })
    }

    pub fn sensor(&self) -> &dyn Sensor {
        match &self.kind {
            SensorKind::Ray(s) => s,
            SensorKind::Grid(s) => s,
            SensorKind::Pixel(s) => s,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            SensorKind::Ray(_) => "ray",
            SensorKind::Grid(_) => "grid",
            SensorKind::Pixel(_) => "pixel",
        }
    }

    /// Runs one pass. Pixel sensors render from their own camera and ignore
    /// the agent pose.
    fn sample(&mut self, pose: &SensorPose, world: &SceneWorld) -> Result<(), SensorError> {
        match &mut self.kind {
            SensorKind::Ray(s) => {
                s.sample(pose, world);
            }
            SensorKind::Grid(s) => {
                s.sample(pose, world);
            }
            SensorKind::Pixel(s) => {
                s.capture(world)?;
            }
        }
        Ok(())
    }

    fn observe(&mut self, pose: &SensorPose, world: &SceneWorld) -> Result<Vec<f32>, SensorError> {
        self.sample(pose, world)?;
        self.sensor().observations_vector()
    }
}

// =========================================================================
// == Agents ==
// =========================================================================

#[derive(Debug, Clone)]
pub struct Agent {
    pub name: String,
    pub pose: SensorPose,
    /// World-frame velocity in m/s.
    pub velocity: Vector3<f32>,
    /// Degrees per second about the agent's own up axis.
    pub yaw_rate: f32,
    pub sensors: Vec<MountedSensor>,
}

impl Agent {
    fn from_config(
        config: &AgentConfig,
        cameras: &HashMap<String, CameraHandle>,
    ) -> Result<Self, SimError> {
        let sensors = config
            .sensors
            .iter()
            .map(|s| MountedSensor::from_config(s, &config.name, cameras))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name: config.name.clone(),
            pose: config.pose,
            velocity: Vector3::from(config.velocity),
            yaw_rate: config.yaw_rate,
            sensors,
        })
    }

    /// Moves the agent forward in time by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.pose.position += self.velocity * dt;
        if self.yaw_rate != 0.0 {
            let angle = (self.yaw_rate * dt).to_radians();
            let turn = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), angle);
            self.pose.rotation *= turn;
        }
    }
}

/// A camera whose pose is an offset from an agent.
#[derive(Debug, Clone)]
struct FollowCamera {
    handle: CameraHandle,
    agent: usize,
    offset: SensorPose,
}

// =========================================================================
// == Observation Records ==
// =========================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorRecord {
    pub name: String,
    pub kind: String,
    pub dim: usize,
    pub advertised_dim: usize,
    pub values: Vec<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentRecord {
    pub name: String,
    pub position: [f32; 3],
    pub sensors: Vec<SensorRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickRecord {
    pub tick: u32,
    pub time: f32,
    pub agents: Vec<AgentRecord>,
}

/// Everything a run observed, in tick order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ObservationLog {
    /// Files written by snapshotting pixel sensors.
    pub snapshots: Vec<PathBuf>,
    pub ticks: Vec<TickRecord>,
}

impl ObservationLog {
    pub fn to_toml(&self) -> Result<String, SimError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The record for `sensor` on `agent` at `tick`.
    pub fn find(&self, tick: u32, agent: &str, sensor: &str) -> Option<&SensorRecord> {
        self.ticks
            .iter()
            .find(|t| t.tick == tick)?
            .agents
            .iter()
            .find(|a| a.name == agent)?
            .sensors
            .iter()
            .find(|s| s.name == sensor)
    }
}

// =========================================================================
// == Simulation ==
// =========================================================================

#[derive(Debug)]
pub struct Simulation {
    world: SceneWorld,
    agents: Vec<Agent>,
    followers: Vec<FollowCamera>,
    ticks: u32,
    dt: f32,
    snapshot_dir: Option<PathBuf>,
}

impl Simulation {
    pub fn from_config(config: ScenarioConfig) -> Result<Self, SimError> {
        let mut world = build_world(&config.world, config.simulation.seed);

        let mut handles = HashMap::new();
        for camera in &config.cameras {
            let handle = world.add_camera(camera_from_config(camera));
            handles.insert(camera.name.clone(), handle);
        }

        let agents = config
            .agents
            .iter()
            .map(|a| Agent::from_config(a, &handles))
            .collect::<Result<Vec<_>, _>>()?;

        let mut followers = Vec::new();
        for camera in &config.cameras {
            let Some(target) = &camera.follow else {
                continue;
            };
            let agent = agents
                .iter()
                .position(|a| &a.name == target)
                .ok_or_else(|| SimError::UnknownAgent(target.clone()))?;
            if let Some(&handle) = handles.get(&camera.name) {
                followers.push(FollowCamera {
                    handle,
                    agent,
                    offset: camera.pose,
                });
            }
        }

        info!(
            "Simulation ready: {} agents, {} cameras, {} ticks",
            agents.len(),
            config.cameras.len(),
            config.simulation.ticks
        );
        Ok(Self {
            world,
            agents,
            followers,
            ticks: config.simulation.ticks,
            dt: config.simulation.dt,
            snapshot_dir: config.simulation.snapshot_dir,
        })
    }

    pub fn world(&self) -> &SceneWorld {
        &self.world
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Runs every tick, then writes snapshots for the pixel sensors that ask
    /// for one.
    pub fn run(&mut self) -> Result<ObservationLog, SimError> {
        let mut log = ObservationLog::default();
        for tick in 0..self.ticks {
            log.ticks.push(self.step(tick));
        }
        log.snapshots = self.take_snapshots()?;
        Ok(log)
    }

    /// Samples every sensor at the current poses, then advances the agents.
    /// Sensor failures are recorded, not fatal.
    pub fn step(&mut self, tick: u32) -> TickRecord {
        self.sync_cameras();

        let mut agents = Vec::with_capacity(self.agents.len());
        for agent in &mut self.agents {
            let mut sensors = Vec::with_capacity(agent.sensors.len());
            for mounted in &mut agent.sensors {
                let outcome = mounted.observe(&agent.pose, &self.world);
                if let Err(e) = &outcome {
                    if !mounted.failing {
                        warn!("Sensor '{}' on '{}' failed: {}", mounted.name, agent.name, e);
                    }
                }
                mounted.failing = outcome.is_err();

                let sensor = mounted.sensor();
                let (values, error) = match outcome {
                    Ok(values) => (values, None),
                    Err(e) => (Vec::new(), Some(e.to_string())),
                };
                sensors.push(SensorRecord {
                    name: mounted.name.clone(),
                    kind: mounted.kind_name().to_string(),
                    dim: sensor.observation_dim(),
                    advertised_dim: sensor.advertised_dim(),
                    values,
                    error,
                });
            }
            let p = agent.pose.position;
            agents.push(AgentRecord {
                name: agent.name.clone(),
                position: [p.x, p.y, p.z],
                sensors,
            });
        }

        for agent in &mut self.agents {
            agent.advance(self.dt);
        }
        debug!("Tick {} complete", tick);

        TickRecord {
            tick,
            time: tick as f32 * self.dt,
            agents,
        }
    }

    fn sync_cameras(&mut self) {
        for follower in &self.followers {
            let Some(agent) = self.agents.get(follower.agent) else {
                continue;
            };
            if let Some(camera) = self.world.camera_mut(follower.handle) {
                camera.pose.position =
                    agent.pose.position + agent.pose.rotation * follower.offset.position.coords;
                camera.pose.rotation = agent.pose.rotation * follower.offset.rotation;
            }
        }
    }

    fn take_snapshots(&mut self) -> Result<Vec<PathBuf>, SimError> {
        let wanted = self
            .agents
            .iter()
            .flat_map(|a| &a.sensors)
            .filter(|s| s.snapshot)
            .count();
        if wanted == 0 {
            return Ok(Vec::new());
        }
        let Some(dir) = &self.snapshot_dir else {
            warn!("{} pixel sensors want snapshots but no snapshot_dir is set", wanted);
            return Ok(Vec::new());
        };

        let mut store = DirectoryFrameStore::open(dir)?;
        let mut written = Vec::new();
        for agent in &mut self.agents {
            for mounted in agent.sensors.iter_mut().filter(|s| s.snapshot) {
                let SensorKind::Pixel(sensor) = &mut mounted.kind else {
                    continue;
                };
                let name = sensor
                    .take_shot(&self.world, &PpmEncoder, &mut store)
                    .map_err(|source| SimError::Sensor {
                        agent: agent.name.clone(),
                        sensor: mounted.name.clone(),
                        source,
                    })?;
                info!("Saved snapshot of '{}' to {:?}", mounted.name, store.dir().join(&name));
                written.push(store.dir().join(name));
            }
        }
        Ok(written)
    }
}

fn camera_from_config(config: &CameraConfig) -> PinholeCamera {
    PinholeCamera::new(config.pose, config.vertical_fov, config.far)
}
