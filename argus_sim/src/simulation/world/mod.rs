// argus_sim/src/simulation/world/mod.rs

//! The host scene: static colliders plus the cameras that render them.
//!
//! [`SceneWorld`] answers every query the sensors delegate to their host, so
//! a single value can be handed to ray, grid and pixel sensors alike.

pub mod colliders;
pub mod spawner;

use std::collections::HashMap;

use argus_core::prelude::{
    CameraHandle, CastHit, CollisionMask, Overlap, OverlapQuery, Rgba, ShapeCaster,
};
use nalgebra::{Point2, Point3, Unit, UnitQuaternion, Vector2, Vector3};

use crate::simulation::render::camera::PinholeCamera;
pub use colliders::{Collider, Shape};

#[derive(Debug, Clone, Default)]
pub struct SceneWorld {
    colliders: Vec<Collider>,
    cameras: HashMap<CameraHandle, PinholeCamera>,
    next_camera: u64,
    background: Rgba,
}

impl SceneWorld {
    pub fn new(background: Rgba) -> Self {
        Self {
            background,
            ..Default::default()
        }
    }

    pub fn add_collider(&mut self, collider: Collider) {
        self.colliders.push(collider);
    }

    pub fn colliders(&self) -> &[Collider] {
        &self.colliders
    }

    pub fn background(&self) -> Rgba {
        self.background
    }

    /// Registers a camera and returns the handle sensors refer to it by.
    pub fn add_camera(&mut self, camera: PinholeCamera) -> CameraHandle {
        self.next_camera += 1;
        let handle = CameraHandle(self.next_camera);
        self.cameras.insert(handle, camera);
        handle
    }

    pub fn camera(&self, handle: CameraHandle) -> Option<&PinholeCamera> {
        self.cameras.get(&handle)
    }

    pub fn camera_mut(&mut self, handle: CameraHandle) -> Option<&mut PinholeCamera> {
        self.cameras.get_mut(&handle)
    }

    /// The closest collider on `mask` touched by a sphere swept along
    /// `direction`, with the distance travelled.
    pub fn first_hit(
        &self,
        origin: &Point3<f32>,
        direction: &Unit<Vector3<f32>>,
        radius: f32,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Option<(f32, &Collider)> {
        self.colliders
            .iter()
            .filter(|c| mask.contains(c.layer))
            .filter_map(|c| c.sweep(origin, direction, radius).map(|t| (t, c)))
            .filter(|(t, _)| *t <= max_distance)
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }

    fn first_hit_2d(
        &self,
        origin: &Point2<f32>,
        direction: &Unit<Vector2<f32>>,
        radius: f32,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Option<(f32, &Collider)> {
        self.colliders
            .iter()
            .filter(|c| mask.contains(c.layer))
            .filter_map(|c| c.sweep_2d(origin, direction, radius).map(|t| (t, c)))
            .filter(|(t, _)| *t <= max_distance)
            .min_by(|a, b| a.0.total_cmp(&b.0))
    }
}

impl ShapeCaster for SceneWorld {
    fn sphere_cast(
        &self,
        origin: &Point3<f32>,
        radius: f32,
        direction: &Unit<Vector3<f32>>,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Option<CastHit> {
        self.first_hit(origin, direction, radius, max_distance, mask)
            .map(|(distance, c)| CastHit {
                distance,
                tag: c.tag.clone(),
            })
    }

    fn circle_cast(
        &self,
        origin: &Point2<f32>,
        radius: f32,
        direction: &Unit<Vector2<f32>>,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Option<CastHit> {
        self.first_hit_2d(origin, direction, radius, max_distance, mask)
            .map(|(distance, c)| CastHit {
                distance,
                tag: c.tag.clone(),
            })
    }
}

impl OverlapQuery for SceneWorld {
    /// Rotated boxes are tested through their world-aligned bounding box.
    fn box_overlap(
        &self,
        center: &Point3<f32>,
        half_extents: &Vector3<f32>,
        orientation: &UnitQuaternion<f32>,
        mask: CollisionMask,
    ) -> Vec<Overlap> {
        let bounds = orientation.to_rotation_matrix().matrix().abs() * half_extents;
        self.colliders
            .iter()
            .filter(|c| mask.contains(c.layer) && c.intersects_box(center, &bounds))
            .map(|c| Overlap { tag: c.tag.clone() })
            .collect()
    }

    fn box_overlap_2d(
        &self,
        center: &Point2<f32>,
        half_extents: &Vector2<f32>,
        mask: CollisionMask,
    ) -> Option<Overlap> {
        self.colliders
            .iter()
            .find(|c| mask.contains(c.layer) && c.intersects_rect(center, half_extents))
            .map(|c| Overlap { tag: c.tag.clone() })
    }
}
