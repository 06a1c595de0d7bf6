// argus_sim/src/simulation/debugging.rs

//! A [`DebugHook`] that reports sensor traces through `tracing` instead of
//! drawing them.

use argus_core::prelude::{DebugHook, GridCellTrace, RayTrace};
use tracing::{debug, trace};

#[derive(Debug, Clone)]
pub struct TracingDebugHook {
    sensor: String,
}

impl TracingDebugHook {
    pub fn new(sensor: impl Into<String>) -> Self {
        Self {
            sensor: sensor.into(),
        }
    }
}

impl DebugHook for TracingDebugHook {
    fn on_rays(&self, traces: &[RayTrace]) {
        let hits = traces.iter().filter(|t| t.hit_distance.is_some()).count();
        debug!(sensor = %self.sensor, rays = traces.len(), hits, "ray pass");
        for t in traces {
            trace!(
                sensor = %self.sensor,
                id = t.ray.id,
                origin = ?t.ray.origin,
                direction = ?t.ray.direction.into_inner(),
                hit = ?t.hit_distance,
                tag_index = t.info.hit_tag_index,
                "ray"
            );
        }
    }

    fn on_grid(&self, traces: &[GridCellTrace]) {
        let occupied: Vec<_> = traces.iter().filter(|t| t.info.has_overlap).collect();
        debug!(
            sensor = %self.sensor,
            cells = traces.len(),
            occupied = occupied.len(),
            "grid pass"
        );
        for t in occupied {
            trace!(
                sensor = %self.sensor,
                index = ?t.index,
                center = ?t.center,
                tag_index = t.info.overlap_tag_index,
                "cell"
            );
        }
    }
}
