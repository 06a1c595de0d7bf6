// argus_core/src/types.rs

use nalgebra::{Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use crate::utils::serde_helpers;

// --- World & Capture Modes ---

/// Which physics world a sensor queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorldMode {
    #[default]
    World3d,
    World2d,
}

/// Post-processing applied to a captured image.
///
/// Note the encoding in [`crate::encoding::encode_pixels`]: `Rgb` emits one
/// luma value per pixel and `Grayscale` emits three channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CaptureType {
    #[default]
    Rgb,
    Grayscale,
}

// --- Collision Filtering ---

/// A 32-layer bitmask selecting which colliders a query may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionMask(pub u32);

impl CollisionMask {
    pub const fn all() -> Self {
        Self(u32::MAX)
    }

    pub const fn none() -> Self {
        Self(0)
    }

    /// Builds a mask from layer indices. Layers outside `0..32` are ignored.
    pub fn from_layers(layers: &[u8]) -> Self {
        Self(
            layers
                .iter()
                .filter(|&&l| l < 32)
                .fold(0, |bits, &l| bits | (1u32 << l)),
        )
    }

    pub fn contains(self, layer: u8) -> bool {
        layer < 32 && self.0 & (1u32 << layer) != 0
    }

    pub fn bits(self) -> u32 {
        self.0
    }
}

impl Default for CollisionMask {
    fn default() -> Self {
        Self::all()
    }
}

// --- Sensor Frame ---

/// World placement of the entity a sensor is attached to.
///
/// Local axes follow the host convention of +X right, +Y up and +Z forward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensorPose {
    #[serde(with = "serde_helpers::point3_from_array")]
    pub position: Point3<f32>,
    /// Serialized as `[roll, pitch, yaw]` in degrees.
    #[serde(with = "serde_helpers::quat_from_euler_deg")]
    pub rotation: UnitQuaternion<f32>,
    #[serde(with = "serde_helpers::vec3_from_array")]
    pub scale: Vector3<f32>,
}

impl Default for SensorPose {
    fn default() -> Self {
        Self {
            position: Point3::origin(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }
}

impl SensorPose {
    pub fn from_position(position: Point3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: UnitQuaternion<f32>) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vector3<f32>) -> Self {
        self.scale = scale;
        self
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.rotation * Vector3::z()
    }

    pub fn up(&self) -> Vector3<f32> {
        self.rotation * Vector3::y()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.rotation * Vector3::x()
    }

    /// Length of the scale vector; `sqrt(3)` for a unit-scaled entity.
    pub fn scale_magnitude(&self) -> f32 {
        self.scale.norm()
    }
}

// --- Query Results ---

/// A single hit returned by a sphere or circle cast.
#[derive(Debug, Clone, PartialEq)]
pub struct CastHit {
    /// Distance travelled along the cast direction before contact.
    pub distance: f32,
    pub tag: String,
}

/// A collider reported by an overlap query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    pub tag: String,
}

// --- Imaging ---

/// Opaque handle naming a camera owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CameraHandle(pub u64);

/// A linear RGBA colour with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Perceptual luma: `0.299 r + 0.587 g + 0.114 b`.
    pub fn luma(&self) -> f32 {
        0.299 * self.r + 0.587 * self.g + 0.114 * self.b
    }

    /// This colour with every colour channel replaced by its luma. Alpha is kept.
    pub fn grayscale(&self) -> Self {
        let l = self.luma();
        Self::new(l, l, l, self.a)
    }

    pub fn scaled(&self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor, self.a)
    }
}

/// A captured image, stored row-major starting from the bottom row.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgba>,
}

impl PixelBuffer {
    /// A fully transparent black buffer.
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::default(); width as usize * height as usize],
        }
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y as usize * self.width as usize + x as usize)
    }

    /// Rows in storage order.
    pub fn rows(&self) -> impl DoubleEndedIterator<Item = &[Rgba]> {
        self.pixels.chunks(self.width.max(1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn mask_layers() {
        let mask = CollisionMask::from_layers(&[0, 3, 40]);
        assert!(mask.contains(0));
        assert!(mask.contains(3));
        assert!(!mask.contains(1));
        assert!(!mask.contains(40));
        assert_eq!(mask.bits(), 0b1001);
        assert!(CollisionMask::default().contains(31));
        assert!(!CollisionMask::none().contains(0));
    }

    #[test]
    fn pose_axes_follow_rotation() {
        let pose = SensorPose::default().with_rotation(UnitQuaternion::from_axis_angle(
            &Vector3::y_axis(),
            std::f32::consts::FRAC_PI_2,
        ));
        let f = pose.forward();
        assert_abs_diff_eq!(f.x, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(f.z, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pose.up().y, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(pose.scale_magnitude(), 3f32.sqrt(), epsilon = 1e-6);
    }

    #[test]
    fn pure_red_luma() {
        let gray = Rgba::new(1.0, 0.0, 0.0, 1.0).grayscale();
        assert_abs_diff_eq!(gray.r, 0.299, epsilon = 1e-6);
        assert_abs_diff_eq!(gray.g, 0.299, epsilon = 1e-6);
        assert_abs_diff_eq!(gray.b, 0.299, epsilon = 1e-6);
        assert_eq!(gray.a, 1.0);
    }

    #[test]
    fn buffer_indexing() {
        let mut buffer = PixelBuffer::blank(3, 2);
        buffer.pixels[4] = Rgba::BLACK;
        assert_eq!(buffer.get(1, 1), Some(&Rgba::BLACK));
        assert_eq!(buffer.get(3, 0), None);
        assert_eq!(buffer.rows().count(), 2);
    }
}
