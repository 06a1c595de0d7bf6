// argus_core/src/abstractions.rs

//! The contracts between the sampling core and its host.
//!
//! Hosts implement the query traits over their own physics and rendering
//! back ends. All query methods take `&self`: one back end may serve many
//! sensors, including from several threads, as long as it tolerates
//! concurrent read-only queries.

use dyn_clone::DynClone;
use nalgebra::{Point2, Point3, Unit, UnitQuaternion, Vector2, Vector3};
use std::fmt::Debug;

use crate::error::Result;
use crate::sensors::grid::GridCellTrace;
use crate::sensors::ray::RayTrace;
use crate::types::{CameraHandle, CastHit, CollisionMask, Overlap, PixelBuffer};

// --- SENSOR CONTRACT ---

/// Anything that produces a flat observation vector for a learning agent.
pub trait Sensor {
    /// Length of the vector the next sampling pass will produce.
    fn observation_dim(&self) -> usize;

    /// The dimension a user-facing inspector would quote for this sensor.
    /// Kept for reporting only; it may differ from [`Sensor::observation_dim`].
    fn advertised_dim(&self) -> usize {
        self.observation_dim()
    }

    /// Encodes the most recent sampling pass.
    fn observations_vector(&self) -> Result<Vec<f32>>;
}

// --- SPATIAL QUERIES ---

/// Swept-volume casts used by the ray sensor.
pub trait ShapeCaster: Send + Sync {
    /// Sweeps a sphere of `radius` from `origin` along `direction`.
    /// Returns the closest hit within `max_distance`, if any.
    fn sphere_cast(
        &self,
        origin: &Point3<f32>,
        radius: f32,
        direction: &Unit<Vector3<f32>>,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Option<CastHit>;

    /// The 2D analogue of [`ShapeCaster::sphere_cast`] in the XY plane.
    fn circle_cast(
        &self,
        origin: &Point2<f32>,
        radius: f32,
        direction: &Unit<Vector2<f32>>,
        max_distance: f32,
        mask: CollisionMask,
    ) -> Option<CastHit>;
}

/// Volume overlap tests used by the grid sensor.
pub trait OverlapQuery: Send + Sync {
    /// Every collider intersecting the oriented box. Order is the host's.
    fn box_overlap(
        &self,
        center: &Point3<f32>,
        half_extents: &Vector3<f32>,
        orientation: &UnitQuaternion<f32>,
        mask: CollisionMask,
    ) -> Vec<Overlap>;

    /// The first collider intersecting the axis-aligned rectangle, if any.
    fn box_overlap_2d(
        &self,
        center: &Point2<f32>,
        half_extents: &Vector2<f32>,
        mask: CollisionMask,
    ) -> Option<Overlap>;
}

// --- IMAGING & STORAGE ---

pub trait RenderTarget: Send + Sync {
    /// Renders `camera` into a `width` x `height` buffer.
    fn render_to_buffer(&self, camera: CameraHandle, width: u32, height: u32) -> PixelBuffer;
}

pub trait ImageEncoder {
    /// File extension of the produced format, without the dot (e.g. `"ppm"`).
    fn extension(&self) -> &str;

    fn encode_image(&self, buffer: &PixelBuffer) -> Vec<u8>;
}

/// Where snapshots end up.
pub trait FrameStore {
    /// File names already present in the target location.
    fn list_frames(&self) -> Result<Vec<String>>;

    fn write_frame(&mut self, name: &str, bytes: &[u8]) -> Result<()>;
}

// --- VISUALIZATION ---

/// Receives the per-pass data of a sensor for drawing or logging.
///
/// Both methods default to doing nothing so a hook only implements what it
/// cares about. Hooks see the pass before it becomes the sensor's current
/// observation.
pub trait DebugHook: DynClone + Debug + Send + Sync {
    fn on_rays(&self, _traces: &[RayTrace]) {}

    fn on_grid(&self, _traces: &[GridCellTrace]) {}
}

// Make the trait object cloneable.
dyn_clone::clone_trait_object!(DebugHook);
