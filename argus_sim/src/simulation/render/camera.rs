// argus_sim/src/simulation/render/camera.rs

use argus_core::prelude::SensorPose;
use nalgebra::{Unit, Vector3};

/// A pinhole camera looking along its pose's forward (+Z) axis.
#[derive(Debug, Clone, PartialEq)]
pub struct PinholeCamera {
    pub pose: SensorPose,
    /// Full vertical field of view in degrees.
    pub vertical_fov: f32,
    /// Nothing beyond this distance is drawn.
    pub far: f32,
}

impl Default for PinholeCamera {
    fn default() -> Self {
        Self {
            pose: SensorPose::default(),
            vertical_fov: 60.0,
            far: 100.0,
        }
    }
}

impl PinholeCamera {
    pub fn new(pose: SensorPose, vertical_fov: f32, far: f32) -> Self {
        Self {
            pose,
            vertical_fov,
            far,
        }
    }

    /// World direction through the centre of pixel `(x, y)`, where `y` counts
    /// up from the bottom row.
    pub fn pixel_direction(&self, x: u32, y: u32, width: u32, height: u32) -> Unit<Vector3<f32>> {
        let tan_half = (self.vertical_fov.to_radians() * 0.5).tan();
        let aspect = width as f32 / height as f32;
        let u = ((x as f32 + 0.5) / width as f32 * 2.0 - 1.0) * tan_half * aspect;
        let v = ((y as f32 + 0.5) / height as f32 * 2.0 - 1.0) * tan_half;
        Unit::new_normalize(self.pose.rotation * Vector3::new(u, v, 1.0))
    }
}
