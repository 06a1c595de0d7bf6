// argus_core/src/prelude.rs

// --- Core Abstractions (The main contracts of the library) ---
pub use crate::abstractions::{
    DebugHook, FrameStore, ImageEncoder, OverlapQuery, RenderTarget, Sensor, ShapeCaster,
};

// --- Core Data Structures ---
pub use crate::error::{Result, SensorError};
pub use crate::tags::{classify, DetectableTags, TagMatch};
pub use crate::types::{
    CameraHandle, CaptureType, CastHit, CollisionMask, Overlap, PixelBuffer, Rgba, SensorPose,
    WorldMode,
};

// --- Sensors ---
pub use crate::sensors::grid::{
    sample_grid, GridCellInfo, GridCellTrace, GridObservation, GridSensor, GridSensorConfig,
};
pub use crate::sensors::pixel::{capture, PixelSensor, PixelSensorConfig};
pub use crate::sensors::ray::{
    generate_rays, sample_rays, RayInfo, RaySensor, RaySensorConfig, RayTrace, SensorRay,
};
