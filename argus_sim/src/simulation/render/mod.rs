// argus_sim/src/simulation/render/mod.rs

//! A software renderer over the scene: one cast per pixel, flat colour with
//! Lambert shading against a head-on light.

pub mod camera;

use argus_core::prelude::{CameraHandle, CollisionMask, PixelBuffer, RenderTarget, Rgba};
use nalgebra::{Point3, Unit, Vector3};
use tracing::warn;

use crate::simulation::world::SceneWorld;

/// Light every lit surface receives regardless of its angle.
const AMBIENT: f32 = 0.25;

impl SceneWorld {
    fn shade(&self, origin: &Point3<f32>, direction: &Unit<Vector3<f32>>, far: f32) -> Rgba {
        match self.first_hit(origin, direction, 0.0, far, CollisionMask::all()) {
            Some((t, collider)) => {
                let point = origin + direction.into_inner() * t;
                let lambert = collider.normal_at(&point).dot(&-direction.into_inner()).max(0.0);
                collider.color.scaled(AMBIENT + (1.0 - AMBIENT) * lambert)
            }
            None => self.background(),
        }
    }
}

impl RenderTarget for SceneWorld {
    fn render_to_buffer(&self, camera: CameraHandle, width: u32, height: u32) -> PixelBuffer {
        let Some(cam) = self.camera(camera) else {
            warn!("Render requested for unknown camera {:?}", camera);
            return PixelBuffer::blank(width, height);
        };
        if width == 0 || height == 0 {
            return PixelBuffer::blank(width, height);
        }

        let origin = cam.pose.position;
        let pixels = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| self.shade(&origin, &cam.pixel_direction(x, y, width, height), cam.far))
            .collect();
        PixelBuffer {
            width,
            height,
            pixels,
        }
    }
}
