// argus_core/src/sensors/ray.rs

use nalgebra::{Point2, Point3, Unit, UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::require;
use crate::abstractions::{DebugHook, Sensor, ShapeCaster};
use crate::encoding::{encode_rays, RAY_FIELDS};
use crate::error::Result;
use crate::tags::DetectableTags;
use crate::types::{CastHit, CollisionMask, SensorPose, WorldMode};

// =========================================================================
// == Configuration ==
// =========================================================================

/// Parameters of a ray fan. Angles are in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RaySensorConfig {
    pub world: WorldMode,
    pub collision_mask: CollisionMask,
    pub detectable_tags: DetectableTags,
    /// Number of rays in the fan; also the number of `RayInfo` per pass.
    pub rays: u32,
    /// Total angular spread of the fan.
    pub field_of_view: f32,
    pub rotation_offset: f32,
    /// Maximum cast length.
    pub distance: f32,
    pub cast_radius: f32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub z_offset: f32,
    /// Vertical tilt of the fan. Ignored in 2D.
    pub tilt: f32,
}

impl Default for RaySensorConfig {
    fn default() -> Self {
        Self {
            world: WorldMode::World3d,
            collision_mask: CollisionMask::all(),
            detectable_tags: DetectableTags::default(),
            rays: 5,
            field_of_view: 45.0,
            rotation_offset: 0.0,
            distance: 100.0,
            cast_radius: 0.5,
            x_offset: 0.0,
            y_offset: 0.0,
            z_offset: 0.0,
            tilt: 0.0,
        }
    }
}

impl RaySensorConfig {
    pub fn validate(&self) -> Result<()> {
        require("ray", self.rays >= 1, || "at least one ray is required".into())?;
        require("ray", self.distance.is_finite() && self.distance > 0.0, || {
            format!("distance must be positive, got {}", self.distance)
        })?;
        require(
            "ray",
            self.cast_radius.is_finite() && self.cast_radius >= 0.0,
            || format!("cast radius must be non-negative, got {}", self.cast_radius),
        )?;
        let angles = [
            self.field_of_view,
            self.rotation_offset,
            self.tilt,
            self.x_offset,
            self.y_offset,
            self.z_offset,
        ];
        require("ray", angles.iter().all(|a| a.is_finite()), || {
            "angles and offsets must be finite".into()
        })
    }

    /// Signed angle between consecutive rays. Zero for a single ray.
    pub fn angular_step(&self) -> f32 {
        if self.rays <= 1 {
            0.0
        } else {
            -self.field_of_view / (self.rays - 1) as f32
        }
    }

    /// Angle of ray 0 relative to the entity's forward (3D) or up (2D) axis.
    pub fn begin_angle(&self) -> f32 {
        -self.angular_step() * (self.rays as f32 - 1.0) / 2.0 + self.rotation_offset
    }

    /// Where every ray starts: the entity position shifted along its local
    /// axes by the offsets, scaled by the entity's scale magnitude.
    pub fn cast_origin(&self, pose: &SensorPose) -> Point3<f32> {
        let local = pose.right() * self.x_offset
            + pose.up() * self.y_offset
            + pose.forward() * self.z_offset;
        pose.position + local * pose.scale_magnitude()
    }
}

// =========================================================================
// == Per-Ray Data ==
// =========================================================================

/// The classified outcome of one cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayInfo {
    pub has_hit: bool,
    /// Hit distance divided by the cast length; 0 on a miss.
    pub hit_fraction: f32,
    /// Whether the hit object's tag is in the detectable list.
    pub hit_tagged_object: bool,
    /// Position of the hit object's tag in the detectable list, or -1.
    pub hit_tag_index: i32,
}

impl Default for RayInfo {
    fn default() -> Self {
        Self {
            has_hit: false,
            hit_fraction: 0.0,
            hit_tagged_object: false,
            hit_tag_index: -1,
        }
    }
}

impl RayInfo {
    pub fn from_hit(hit: Option<&CastHit>, max_distance: f32, tags: &DetectableTags) -> Self {
        match hit {
            Some(hit) => {
                let tag = tags.classify(Some(hit.tag.as_str()));
                Self {
                    has_hit: true,
                    hit_fraction: (hit.distance / max_distance).clamp(0.0, 1.0),
                    hit_tagged_object: tag.matched,
                    hit_tag_index: tag.index,
                }
            }
            None => Self::default(),
        }
    }
}

/// One ray of the fan, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorRay {
    /// Position in the fan; 0 is the starting edge.
    pub id: u32,
    pub origin: Point3<f32>,
    pub direction: Unit<Vector3<f32>>,
}

/// A cast ray together with its outcome, as handed to a [`DebugHook`].
#[derive(Debug, Clone, PartialEq)]
pub struct RayTrace {
    pub ray: SensorRay,
    pub radius: f32,
    pub max_distance: f32,
    /// Raw hit distance, when something was hit.
    pub hit_distance: Option<f32>,
    pub info: RayInfo,
}

// =========================================================================
// == Sampling ==
// =========================================================================

/// Computes the fan of rays for `pose` without casting anything.
///
/// In 3D the fan sweeps around the entity's up axis starting from its
/// forward axis, tilted about the axis orthogonal to both. In 2D it sweeps
/// around the forward axis starting from the up axis.
pub fn generate_rays(config: &RaySensorConfig, pose: &SensorPose) -> Vec<SensorRay> {
    let step = config.angular_step();
    let begin = config.begin_angle();
    let forward = pose.forward();
    let up = pose.up();

    let (sweep_axis, start_direction) = match config.world {
        WorldMode::World3d => {
            let up_axis = Unit::new_normalize(up);
            let rotated_forward =
                UnitQuaternion::from_axis_angle(&up_axis, begin.to_radians()) * forward;
            let tilt_axis = Unit::new_normalize(rotated_forward.cross(&up));
            let tilt = UnitQuaternion::from_axis_angle(&tilt_axis, config.tilt.to_radians());
            (up_axis, tilt * rotated_forward)
        }
        WorldMode::World2d => {
            let forward_axis = Unit::new_normalize(forward);
            let start = UnitQuaternion::from_axis_angle(&forward_axis, begin.to_radians()) * up;
            (forward_axis, start)
        }
    };

    let origin = config.cast_origin(pose);
    (0..config.rays)
        .map(|id| {
            let angle = (id as f32 * step).to_radians();
            let sweep = UnitQuaternion::from_axis_angle(&sweep_axis, angle);
            SensorRay {
                id,
                origin,
                direction: Unit::new_normalize(sweep * start_direction),
            }
        })
        .collect()
}

fn cast(config: &RaySensorConfig, ray: &SensorRay, caster: &dyn ShapeCaster) -> Option<CastHit> {
    match config.world {
        WorldMode::World3d => caster.sphere_cast(
            &ray.origin,
            config.cast_radius,
            &ray.direction,
            config.distance,
            config.collision_mask,
        ),
        WorldMode::World2d => {
            // A fan lying out of the XY plane has no 2D direction to cast along.
            let planar = Unit::try_new(Vector2::new(ray.direction.x, ray.direction.y), 1e-6)?;
            caster.circle_cast(
                &Point2::new(ray.origin.x, ray.origin.y),
                config.cast_radius,
                &planar,
                config.distance,
                config.collision_mask,
            )
        }
    }
}

/// Casts every ray of the fan and keeps the full trace of each.
pub fn trace_rays(
    config: &RaySensorConfig,
    pose: &SensorPose,
    caster: &dyn ShapeCaster,
) -> Vec<RayTrace> {
    generate_rays(config, pose)
        .into_iter()
        .map(|ray| {
            let hit = cast(config, &ray, caster);
            let info = RayInfo::from_hit(hit.as_ref(), config.distance, &config.detectable_tags);
            RayTrace {
                ray,
                radius: config.cast_radius,
                max_distance: config.distance,
                hit_distance: hit.map(|h| h.distance),
                info,
            }
        })
        .collect()
}

/// One full sampling pass: exactly `config.rays` results in fan order.
pub fn sample_rays(
    config: &RaySensorConfig,
    pose: &SensorPose,
    caster: &dyn ShapeCaster,
) -> Vec<RayInfo> {
    trace_rays(config, pose, caster)
        .into_iter()
        .map(|t| t.info)
        .collect()
}

// =========================================================================
// == Stateful Sensor ==
// =========================================================================

/// A ray sensor holding its configuration and the results of its last pass.
#[derive(Debug, Clone)]
pub struct RaySensor {
    config: RaySensorConfig,
    observations: Vec<RayInfo>,
    debug_hook: Option<Box<dyn DebugHook>>,
}

impl RaySensor {
    /// Until the first pass every ray reads as a miss.
    pub fn new(config: RaySensorConfig) -> Result<Self> {
        config.validate()?;
        let observations = vec![RayInfo::default(); config.rays as usize];
        Ok(Self {
            config,
            observations,
            debug_hook: None,
        })
    }

    pub fn with_debug_hook(mut self, hook: Box<dyn DebugHook>) -> Self {
        self.debug_hook = Some(hook);
        self
    }

    pub fn config(&self) -> &RaySensorConfig {
        &self.config
    }

    /// Replaces the configuration for subsequent passes. The stored results
    /// are reset to all-miss so the vector always matches `observation_dim`.
    pub fn set_config(&mut self, config: RaySensorConfig) -> Result<()> {
        config.validate()?;
        self.observations = vec![RayInfo::default(); config.rays as usize];
        self.config = config;
        Ok(())
    }

    pub fn generate_rays(&self, pose: &SensorPose) -> Vec<SensorRay> {
        generate_rays(&self.config, pose)
    }

    /// Runs a pass and replaces the stored results with it in one step.
    pub fn sample(&mut self, pose: &SensorPose, caster: &dyn ShapeCaster) -> &[RayInfo] {
        let traces = trace_rays(&self.config, pose, caster);
        if let Some(hook) = &self.debug_hook {
            hook.on_rays(&traces);
        }
        self.observations = traces.into_iter().map(|t| t.info).collect();
        trace!(
            rays = self.observations.len(),
            hits = self.observations.iter().filter(|r| r.has_hit).count(),
            "ray pass complete"
        );
        &self.observations
    }

    /// Results of the last pass in fan order.
    pub fn observation_rays(&self) -> &[RayInfo] {
        &self.observations
    }
}

impl Sensor for RaySensor {
    fn observation_dim(&self) -> usize {
        RAY_FIELDS * self.config.rays as usize
    }

    fn advertised_dim(&self) -> usize {
        (3 + self.config.detectable_tags.len()) * self.config.rays as usize
    }

    fn observations_vector(&self) -> Result<Vec<f32>> {
        Ok(encode_rays(&self.observations))
    }
}
