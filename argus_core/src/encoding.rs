// argus_core/src/encoding.rs

//! Flattening of sensor results into observation vectors.
//!
//! The layout has no header: a consumer needs the sensor configuration to
//! interpret it. Booleans encode as `1.0`/`0.0` and tag indices as their
//! integer value, `-1.0` meaning "no tagged object".
//!
//! The `*_into` variants append to a caller-owned buffer, so several sensors
//! can be packed into one agent observation without intermediate vectors.

use crate::sensors::grid::GridObservation;
use crate::sensors::ray::RayInfo;
use crate::types::{CaptureType, PixelBuffer};

/// Floats emitted per ray: hit, hit fraction, tagged, tag index.
pub const RAY_FIELDS: usize = 4;
/// Floats emitted per grid cell: overlap, tagged, tag index.
pub const CELL_FIELDS: usize = 3;

fn flag(value: bool) -> f32 {
    if value {
        1.0
    } else {
        0.0
    }
}

pub fn encode_rays(rays: &[RayInfo]) -> Vec<f32> {
    let mut out = Vec::with_capacity(RAY_FIELDS * rays.len());
    encode_rays_into(rays, &mut out);
    out
}

pub fn encode_rays_into(rays: &[RayInfo], out: &mut Vec<f32>) {
    out.reserve(RAY_FIELDS * rays.len());
    for ray in rays {
        out.extend_from_slice(&[
            flag(ray.has_hit),
            ray.hit_fraction,
            flag(ray.hit_tagged_object),
            ray.hit_tag_index as f32,
        ]);
    }
}

/// Cells are emitted depth-major, then by height, then by width.
pub fn encode_grid(grid: &GridObservation) -> Vec<f32> {
    let mut out = Vec::with_capacity(CELL_FIELDS * grid.len());
    encode_grid_into(grid, &mut out);
    out
}

pub fn encode_grid_into(grid: &GridObservation, out: &mut Vec<f32>) {
    out.reserve(CELL_FIELDS * grid.len());
    for cell in grid.cells() {
        out.extend_from_slice(&[
            flag(cell.has_overlap),
            flag(cell.overlapped_tagged_object),
            cell.overlap_tag_index as f32,
        ]);
    }
}

/// Values emitted per pixel. `Rgb` yields a single luma value and
/// `Grayscale` the three colour channels.
pub fn pixel_channels(capture: CaptureType) -> usize {
    match capture {
        CaptureType::Rgb => 1,
        CaptureType::Grayscale => 3,
    }
}

pub fn encode_pixels(buffer: &PixelBuffer, capture: CaptureType) -> Vec<f32> {
    let mut out = Vec::with_capacity(pixel_channels(capture) * buffer.len());
    encode_pixels_into(buffer, capture, &mut out);
    out
}

pub fn encode_pixels_into(buffer: &PixelBuffer, capture: CaptureType, out: &mut Vec<f32>) {
    out.reserve(pixel_channels(capture) * buffer.len());
    match capture {
        CaptureType::Rgb => out.extend(buffer.pixels.iter().map(|p| p.luma())),
        CaptureType::Grayscale => {
            for p in &buffer.pixels {
                out.extend_from_slice(&[p.r, p.g, p.b]);
            }
        }
    }
}
