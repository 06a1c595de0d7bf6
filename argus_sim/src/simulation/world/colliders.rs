// argus_sim/src/simulation/world/colliders.rs

//! Analytic shapes and the cast and overlap math the scene answers with.

use argus_core::prelude::Rgba;
use nalgebra::{Point2, Point3, Vector2, Vector3};

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Sphere {
        center: Point3<f32>,
        radius: f32,
    },
    /// An axis-aligned box.
    Cuboid {
        center: Point3<f32>,
        half_extents: Vector3<f32>,
    },
}

/// A static obstacle in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Collider {
    pub shape: Shape,
    pub tag: String,
    pub layer: u8,
    pub color: Rgba,
}

impl Collider {
    pub fn new(shape: Shape, tag: impl Into<String>) -> Self {
        Self {
            shape,
            tag: tag.into(),
            layer: 0,
            color: Rgba::new(0.6, 0.6, 0.6, 1.0),
        }
    }

    pub fn on_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }

    /// Distance a sphere of `radius` travels along the unit `direction` before
    /// touching this collider. Colliders the sphere already overlaps at
    /// `origin` are not reported.
    ///
    /// Boxes are swept as the box inflated by `radius` on every axis, which
    /// slightly over-reports hits near the edges.
    pub fn sweep(
        &self,
        origin: &Point3<f32>,
        direction: &Vector3<f32>,
        radius: f32,
    ) -> Option<f32> {
        match &self.shape {
            Shape::Sphere { center, radius: r } => {
                let oc = origin - center;
                ray_sphere(oc.dot(direction), oc.norm_squared(), r + radius)
            }
            Shape::Cuboid {
                center,
                half_extents,
            } => {
                let grown = half_extents.add_scalar(radius);
                let min = center - grown;
                let max = center + grown;
                ray_aabb(
                    origin.coords.as_slice(),
                    direction.as_slice(),
                    min.coords.as_slice(),
                    max.coords.as_slice(),
                )
            }
        }
    }

    /// [`Collider::sweep`] against this collider's projection on the XY plane.
    pub fn sweep_2d(
        &self,
        origin: &Point2<f32>,
        direction: &Vector2<f32>,
        radius: f32,
    ) -> Option<f32> {
        match &self.shape {
            Shape::Sphere { center, radius: r } => {
                let oc = origin - center.xy();
                ray_sphere(oc.dot(direction), oc.norm_squared(), r + radius)
            }
            Shape::Cuboid {
                center,
                half_extents,
            } => {
                let grown = half_extents.xy().add_scalar(radius);
                let min = center.xy() - grown;
                let max = center.xy() + grown;
                ray_aabb(
                    origin.coords.as_slice(),
                    direction.as_slice(),
                    min.coords.as_slice(),
                    max.coords.as_slice(),
                )
            }
        }
    }

    /// Whether this collider strictly intersects the axis-aligned box.
    pub fn intersects_box(&self, center: &Point3<f32>, half_extents: &Vector3<f32>) -> bool {
        match &self.shape {
            Shape::Sphere { center: c, radius } => {
                let min = center - half_extents;
                let max = center + half_extents;
                let closest = c.coords.zip_zip_map(&min.coords, &max.coords, |v, lo, hi| {
                    v.clamp(lo, hi)
                });
                (c.coords - closest).norm_squared() < radius * radius
            }
            Shape::Cuboid {
                center: c,
                half_extents: h,
            } => (0..3).all(|i| (c[i] - center[i]).abs() < h[i] + half_extents[i]),
        }
    }

    /// Whether this collider's XY projection strictly intersects the rectangle.
    pub fn intersects_rect(&self, center: &Point2<f32>, half_extents: &Vector2<f32>) -> bool {
        match &self.shape {
            Shape::Sphere { center: c, radius } => {
                let c = c.xy();
                let min = center - half_extents;
                let max = center + half_extents;
                let closest = Point2::new(c.x.clamp(min.x, max.x), c.y.clamp(min.y, max.y));
                (c - closest).norm_squared() < radius * radius
            }
            Shape::Cuboid {
                center: c,
                half_extents: h,
            } => (0..2).all(|i| (c[i] - center[i]).abs() < h[i] + half_extents[i]),
        }
    }

    /// Outward surface normal at a point on (or near) the surface.
    pub fn normal_at(&self, point: &Point3<f32>) -> Vector3<f32> {
        match &self.shape {
            Shape::Sphere { center, .. } => (point - center)
                .try_normalize(f32::EPSILON)
                .unwrap_or_else(Vector3::y),
            Shape::Cuboid {
                center,
                half_extents,
            } => {
                let local = (point - center).component_div(half_extents);
                let axis = local.iamax();
                let mut normal = Vector3::zeros();
                normal[axis] = local[axis].signum();
                normal
            }
        }
    }
}

/// Entry distance into a sphere of `radius` whose centre sits at `-oc` from
/// the ray origin. `None` when the origin starts inside or the ray misses.
fn ray_sphere(oc_dot_dir: f32, oc_len_sq: f32, radius: f32) -> Option<f32> {
    let c = oc_len_sq - radius * radius;
    if c <= 0.0 {
        return None;
    }
    let discriminant = oc_dot_dir * oc_dot_dir - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -oc_dot_dir - discriminant.sqrt();
    (t >= 0.0).then_some(t)
}

/// Slab test over any number of axes. `None` when the origin starts inside
/// the box or the ray misses it.
fn ray_aabb(origin: &[f32], direction: &[f32], min: &[f32], max: &[f32]) -> Option<f32> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut inside = true;

    for axis in 0..origin.len() {
        let (o, d) = (origin[axis], direction[axis]);
        let outside_slab = o < min[axis] || o > max[axis];
        inside &= !outside_slab;

        if d.abs() < f32::EPSILON {
            // Parallel to this slab: must already be within it.
            if outside_slab {
                return None;
            }
            continue;
        }
        let inv = 1.0 / d;
        let (t0, t1) = ((min[axis] - o) * inv, (max[axis] - o) * inv);
        t_enter = t_enter.max(t0.min(t1));
        t_exit = t_exit.min(t0.max(t1));
    }

    if inside || t_enter > t_exit || t_enter < 0.0 {
        None
    } else {
        Some(t_enter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ball(z: f32) -> Collider {
        Collider::new(
            Shape::Sphere {
                center: Point3::new(0.0, 0.0, z),
                radius: 1.0,
            },
            "Ball",
        )
    }

    fn crate_at(z: f32) -> Collider {
        Collider::new(
            Shape::Cuboid {
                center: Point3::new(0.0, 0.0, z),
                half_extents: Vector3::new(1.0, 1.0, 1.0),
            },
            "Crate",
        )
    }

    #[test]
    fn sphere_sweep_stops_at_combined_radius() {
        let t = ball(5.0).sweep(&Point3::origin(), &Vector3::z(), 0.5).unwrap();
        assert_relative_eq!(t, 3.5, epsilon = 1e-5);
    }

    #[test]
    fn box_sweep_uses_inflated_faces() {
        let t = crate_at(5.0).sweep(&Point3::origin(), &Vector3::z(), 0.5).unwrap();
        assert_relative_eq!(t, 3.5, epsilon = 1e-5);
    }

    #[test]
    fn sweeps_ignore_colliders_behind_or_around_the_origin() {
        assert!(ball(-5.0).sweep(&Point3::origin(), &Vector3::z(), 0.5).is_none());
        assert!(ball(0.5).sweep(&Point3::origin(), &Vector3::z(), 0.0).is_none());
        assert!(crate_at(0.0).sweep(&Point3::origin(), &Vector3::z(), 0.0).is_none());
        assert!(crate_at(5.0).sweep(&Point3::origin(), &Vector3::x(), 0.0).is_none());
    }

    #[test]
    fn planar_sweep_projects_onto_xy() {
        let ring = Collider::new(
            Shape::Sphere {
                center: Point3::new(3.0, 0.0, 40.0),
                radius: 1.0,
            },
            "Ring",
        );
        let t = ring
            .sweep_2d(&Point2::origin(), &Vector2::x(), 0.0)
            .unwrap();
        assert_relative_eq!(t, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn box_overlap_is_strict() {
        let half = Vector3::new(0.5, 0.5, 0.5);
        let near = Collider::new(
            Shape::Sphere {
                center: Point3::new(0.0, 0.0, 1.2),
                radius: 0.8,
            },
            "Near",
        );
        let far = Collider::new(
            Shape::Sphere {
                center: Point3::new(0.0, 0.0, 1.2),
                radius: 0.5,
            },
            "Far",
        );
        assert!(near.intersects_box(&Point3::origin(), &half));
        assert!(!far.intersects_box(&Point3::origin(), &half));

        // Faces exactly touching do not count.
        let touching = crate_at(1.5);
        assert!(!touching.intersects_box(&Point3::origin(), &half));
        assert!(touching.intersects_rect(&Point2::origin(), &Vector2::new(0.5, 0.5)));
    }

    #[test]
    fn cuboid_normal_picks_dominant_axis() {
        let normal = crate_at(5.0).normal_at(&Point3::new(0.2, -0.1, 4.0));
        assert_eq!(normal, Vector3::new(0.0, 0.0, -1.0));
    }
}
