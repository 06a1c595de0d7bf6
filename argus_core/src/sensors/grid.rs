// argus_core/src/sensors/grid.rs

use nalgebra::{Point2, Point3, UnitQuaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::require;
use crate::abstractions::{DebugHook, OverlapQuery, Sensor};
use crate::encoding::{encode_grid, CELL_FIELDS};
use crate::error::Result;
use crate::tags::DetectableTags;
use crate::types::{CollisionMask, Overlap, SensorPose, WorldMode};

// =========================================================================
// == Configuration ==
// =========================================================================

/// A regular lattice of overlap boxes centred on the entity.
///
/// The lattice is aligned with the world axes; only the entity's position is
/// used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridSensorConfig {
    pub world: WorldMode,
    pub collision_mask: CollisionMask,
    pub detectable_tags: DetectableTags,
    /// Edge length of one cell.
    pub scale: f32,
    /// Fraction of the cell edge covered by its overlap box.
    pub cast_scale: f32,
    pub width: u32,
    pub height: u32,
    /// Ignored in 2D, where the lattice is a single layer.
    pub depth: u32,
    /// Offsets in cells.
    pub x_offset: f32,
    pub y_offset: f32,
    pub z_offset: f32,
}

impl Default for GridSensorConfig {
    fn default() -> Self {
        Self {
            world: WorldMode::World3d,
            collision_mask: CollisionMask::all(),
            detectable_tags: DetectableTags::default(),
            scale: 1.0,
            cast_scale: 0.95,
            width: 8,
            height: 8,
            depth: 8,
            x_offset: 0.0,
            y_offset: 0.0,
            z_offset: 0.0,
        }
    }
}

impl GridSensorConfig {
    pub fn validate(&self) -> Result<()> {
        require(
            "grid",
            self.width >= 1 && self.height >= 1 && self.depth >= 1,
            || {
                format!(
                    "grid dimensions must be at least 1, got {}x{}x{}",
                    self.width, self.height, self.depth
                )
            },
        )?;
        require("grid", self.scale.is_finite() && self.scale > 0.0, || {
            format!("scale must be positive, got {}", self.scale)
        })?;
        require(
            "grid",
            self.cast_scale > 0.0 && self.cast_scale <= 1.0,
            || format!("cast scale must lie in (0, 1], got {}", self.cast_scale),
        )?;
        require(
            "grid",
            [self.x_offset, self.y_offset, self.z_offset]
                .iter()
                .all(|o| o.is_finite()),
            || "offsets must be finite".into(),
        )
    }

    /// Number of layers actually sampled: `depth` in 3D, 1 in 2D.
    pub fn effective_depth(&self) -> u32 {
        match self.world {
            WorldMode::World3d => self.depth,
            WorldMode::World2d => 1,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize * self.effective_depth() as usize
    }

    /// Centre of cell `(0, 0, 0)`. The 2D lattice keeps the entity's Z.
    pub fn lattice_origin(&self, pose: &SensorPose) -> Point3<f32> {
        let s = self.scale;
        let p = pose.position;
        let x = p.x + (1.0 - self.width as f32) * s / 2.0 + self.x_offset * s;
        let y = p.y + (1.0 - self.height as f32) * s / 2.0 + self.y_offset * s;
        let z = match self.world {
            WorldMode::World3d => p.z + (1.0 - self.depth as f32) * s / 2.0 + self.z_offset * s,
            WorldMode::World2d => p.z,
        };
        Point3::new(x, y, z)
    }

    pub fn cell_center(&self, origin: &Point3<f32>, d: u32, h: u32, w: u32) -> Point3<f32> {
        origin + Vector3::new(w as f32, h as f32, d as f32) * self.scale
    }

    pub fn half_extents(&self) -> Vector3<f32> {
        Vector3::repeat(self.scale * self.cast_scale / 2.0)
    }
}

// =========================================================================
// == Cell Data ==
// =========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCellInfo {
    pub has_overlap: bool,
    /// Whether the representative collider's tag is in the detectable list.
    pub overlapped_tagged_object: bool,
    /// Position of that tag in the detectable list, or -1.
    pub overlap_tag_index: i32,
}

impl Default for GridCellInfo {
    fn default() -> Self {
        Self {
            has_overlap: false,
            overlapped_tagged_object: false,
            overlap_tag_index: -1,
        }
    }
}

impl GridCellInfo {
    /// Classifies a cell from the first collider an overlap query reported.
    pub fn from_overlap(first: Option<&Overlap>, tags: &DetectableTags) -> Self {
        match first {
            Some(overlap) => {
                let tag = tags.classify(Some(overlap.tag.as_str()));
                Self {
                    has_overlap: true,
                    overlapped_tagged_object: tag.matched,
                    overlap_tag_index: tag.index,
                }
            }
            None => Self::default(),
        }
    }
}

/// All cells of one pass, stored flat in depth -> height -> width order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridObservation {
    width: u32,
    height: u32,
    depth: u32,
    cells: Vec<GridCellInfo>,
}

impl GridObservation {
    /// A lattice where every cell reads as empty.
    pub fn empty(width: u32, height: u32, depth: u32) -> Self {
        let len = width as usize * height as usize * depth as usize;
        Self {
            width,
            height,
            depth,
            cells: vec![GridCellInfo::default(); len],
        }
    }

    /// `(depth, height, width)`
    pub fn dims(&self) -> (u32, u32, u32) {
        (self.depth, self.height, self.width)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, d: u32, h: u32, w: u32) -> Option<usize> {
        (d < self.depth && h < self.height && w < self.width).then(|| {
            (d as usize * self.height as usize + h as usize) * self.width as usize + w as usize
        })
    }

    pub fn get(&self, d: u32, h: u32, w: u32) -> Option<&GridCellInfo> {
        self.index(d, h, w).map(|i| &self.cells[i])
    }

    /// Cells in the fixed linearization order.
    pub fn cells(&self) -> &[GridCellInfo] {
        &self.cells
    }
}

/// One queried cell, as handed to a [`DebugHook`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridCellTrace {
    /// `(depth, height, width)`
    pub index: (u32, u32, u32),
    pub center: Point3<f32>,
    pub half_extents: Vector3<f32>,
    pub info: GridCellInfo,
}

// =========================================================================
// == Sampling ==
// =========================================================================

fn query_cell(
    config: &GridSensorConfig,
    center: &Point3<f32>,
    half_extents: &Vector3<f32>,
    overlap: &dyn OverlapQuery,
) -> GridCellInfo {
    let first = match config.world {
        WorldMode::World3d => overlap
            .box_overlap(
                center,
                half_extents,
                &UnitQuaternion::identity(),
                config.collision_mask,
            )
            .into_iter()
            .next(),
        WorldMode::World2d => overlap.box_overlap_2d(
            &Point2::new(center.x, center.y),
            &Vector2::new(half_extents.x, half_extents.y),
            config.collision_mask,
        ),
    };
    GridCellInfo::from_overlap(first.as_ref(), &config.detectable_tags)
}

/// Queries every cell and keeps its trace, in depth -> height -> width order.
pub fn trace_grid(
    config: &GridSensorConfig,
    pose: &SensorPose,
    overlap: &dyn OverlapQuery,
) -> Vec<GridCellTrace> {
    let origin = config.lattice_origin(pose);
    let half_extents = config.half_extents();
    let mut traces = Vec::with_capacity(config.cell_count());

    for d in 0..config.effective_depth() {
        for h in 0..config.height {
            for w in 0..config.width {
                let center = config.cell_center(&origin, d, h, w);
                let info = query_cell(config, &center, &half_extents, overlap);
                traces.push(GridCellTrace {
                    index: (d, h, w),
                    center,
                    half_extents,
                    info,
                });
            }
        }
    }
    traces
}

/// One full sampling pass over the lattice.
pub fn sample_grid(
    config: &GridSensorConfig,
    pose: &SensorPose,
    overlap: &dyn OverlapQuery,
) -> GridObservation {
    let traces = trace_grid(config, pose, overlap);
    observation_from_traces(config, traces)
}

fn observation_from_traces(
    config: &GridSensorConfig,
    traces: Vec<GridCellTrace>,
) -> GridObservation {
    GridObservation {
        width: config.width,
        height: config.height,
        depth: config.effective_depth(),
        cells: traces.into_iter().map(|t| t.info).collect(),
    }
}

// =========================================================================
// == Stateful Sensor ==
// =========================================================================

#[derive(Debug, Clone)]
pub struct GridSensor {
    config: GridSensorConfig,
    observations: GridObservation,
    debug_hook: Option<Box<dyn DebugHook>>,
}

impl GridSensor {
    pub fn new(config: GridSensorConfig) -> Result<Self> {
        config.validate()?;
        let observations =
            GridObservation::empty(config.width, config.height, config.effective_depth());
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

    pub fn config(&self) -> &GridSensorConfig {
        &self.config
    }

    /// Takes effect on the next pass. Until then every cell reads as empty.
    pub fn set_config(&mut self, config: GridSensorConfig) -> Result<()> {
        config.validate()?;
        self.observations =
            GridObservation::empty(config.width, config.height, config.effective_depth());
        self.config = config;
        Ok(())
    }

    pub fn sample(&mut self, pose: &SensorPose, overlap: &dyn OverlapQuery) -> &GridObservation {
        let traces = trace_grid(&self.config, pose, overlap);
        if let Some(hook) = &self.debug_hook {
            hook.on_grid(&traces);
        }
        self.observations = observation_from_traces(&self.config, traces);
        trace!(
            cells = self.observations.len(),
            occupied = self.observations.cells().iter().filter(|c| c.has_overlap).count(),
            "grid pass complete"
        );
        &self.observations
    }

    pub fn observation_grid(&self) -> &GridObservation {
        &self.observations
    }

    /// An owned copy of the last pass.
    pub fn observation_cells(&self) -> GridObservation {
        self.observations.clone()
    }
}

impl Sensor for GridSensor {
    fn observation_dim(&self) -> usize {
        CELL_FIELDS * self.config.cell_count()
    }

    fn advertised_dim(&self) -> usize {
        (2 + self.config.detectable_tags.len()) * self.config.cell_count()
    }

    fn observations_vector(&self) -> Result<Vec<f32>> {
        Ok(encode_grid(&self.observations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::sync::Mutex;

    /// Reports a tagged collider for any box containing one of its points.
    #[derive(Default)]
    struct PointCloudWorld {
        points: Vec<(Point3<f32>, &'static str)>,
        queries: Mutex<usize>,
    }

    impl PointCloudWorld {
        fn with(points: Vec<(Point3<f32>, &'static str)>) -> Self {
            Self {
                points,
                ..Default::default()
            }
        }

        fn inside(p: &Point3<f32>, center: &Point3<f32>, half: &Vector3<f32>) -> bool {
            (p.x - center.x).abs() <= half.x
                && (p.y - center.y).abs() <= half.y
                && (p.z - center.z).abs() <= half.z
        }
    }

    impl OverlapQuery for PointCloudWorld {
        fn box_overlap(
            &self,
            center: &Point3<f32>,
            half_extents: &Vector3<f32>,
            _orientation: &UnitQuaternion<f32>,
            _mask: CollisionMask,
        ) -> Vec<Overlap> {
            *self.queries.lock().unwrap() += 1;
            self.points
                .iter()
                .filter(|(p, _)| Self::inside(p, center, half_extents))
                .map(|(_, tag)| Overlap {
                    tag: tag.to_string(),
                })
                .collect()
        }

        fn box_overlap_2d(
            &self,
            center: &Point2<f32>,
            half_extents: &Vector2<f32>,
            _mask: CollisionMask,
        ) -> Option<Overlap> {
            *self.queries.lock().unwrap() += 1;
            self.points
                .iter()
                .find(|(p, _)| {
                    (p.x - center.x).abs() <= half_extents.x
                        && (p.y - center.y).abs() <= half_extents.y
                })
                .map(|(_, tag)| Overlap {
                    tag: tag.to_string(),
                })
        }
    }

    fn two_by_two() -> GridSensorConfig {
        GridSensorConfig {
            detectable_tags: DetectableTags::new(["Enemy"]),
            scale: 1.0,
            cast_scale: 1.0,
            width: 2,
            height: 2,
            depth: 1,
            ..Default::default()
        }
    }

    #[test]
    fn lattice_is_centred_on_the_entity() {
        let config = GridSensorConfig {
            scale: 2.0,
            width: 3,
            height: 2,
            depth: 1,
            x_offset: 1.0,
            ..Default::default()
        };
        let pose = SensorPose::from_position(Point3::new(10.0, 0.0, 5.0));
        let origin = config.lattice_origin(&pose);
        assert_abs_diff_eq!(origin.x, 10.0 - 2.0 + 2.0);
        assert_abs_diff_eq!(origin.y, -1.0);
        assert_abs_diff_eq!(origin.z, 5.0);
        let far = config.cell_center(&origin, 0, 1, 2);
        assert_abs_diff_eq!(far.x, 14.0);
        assert_abs_diff_eq!(far.y, 1.0);
        assert_abs_diff_eq!(config.half_extents().x, 0.95);
    }

    #[test]
    fn planar_lattice_ignores_depth_terms() {
        let config = GridSensorConfig {
            world: WorldMode::World2d,
            depth: 6,
            z_offset: 3.0,
            ..two_by_two()
        };
        let pose = SensorPose::from_position(Point3::new(0.0, 0.0, 7.0));
        let origin = config.lattice_origin(&pose);
        assert_abs_diff_eq!(origin.z, 7.0);
        assert_eq!(config.effective_depth(), 1);
        assert_eq!(config.cell_count(), 4);
    }

    #[test]
    fn single_hit_end_to_end() {
        let world = PointCloudWorld::with(vec![(Point3::new(0.5, 0.5, 0.0), "Enemy")]);
        let mut sensor = GridSensor::new(two_by_two()).unwrap();
        let grid = sensor.sample(&SensorPose::default(), &world);
        assert_eq!(
            grid.get(0, 1, 1),
            Some(&GridCellInfo {
                has_overlap: true,
                overlapped_tagged_object: true,
                overlap_tag_index: 0,
            })
        );
        assert_eq!(
            sensor.observations_vector().unwrap(),
            vec![0.0, 0.0, -1.0, 0.0, 0.0, -1.0, 0.0, 0.0, -1.0, 1.0, 1.0, 0.0]
        );
        assert_eq!(*world.queries.lock().unwrap(), 4);
    }

    #[test]
    fn first_overlap_is_representative() {
        let world = PointCloudWorld::with(vec![
            (Point3::new(0.0, 0.0, 0.0), "Rock"),
            (Point3::new(0.1, 0.0, 0.0), "Enemy"),
        ]);
        let config = GridSensorConfig {
            width: 1,
            height: 1,
            ..two_by_two()
        };
        let grid = sample_grid(&config, &SensorPose::default(), &world);
        let cell = grid.get(0, 0, 0).unwrap();
        assert!(cell.has_overlap);
        assert!(!cell.overlapped_tagged_object);
        assert_eq!(cell.overlap_tag_index, -1);
    }

    #[test]
    fn vector_length_ignores_tag_count() {
        let config = GridSensorConfig {
            detectable_tags: DetectableTags::new(["A", "B", "C", "D"]),
            width: 3,
            height: 4,
            depth: 5,
            ..Default::default()
        };
        let sensor = GridSensor::new(config).unwrap();
        assert_eq!(sensor.observation_dim(), 3 * 3 * 4 * 5);
        assert_eq!(sensor.observations_vector().unwrap().len(), 180);
        assert_eq!(sensor.advertised_dim(), 6 * 60);
    }

    #[test]
    fn planar_layer_matches_first_volume_layer() {
        let points = vec![
            (Point3::new(-0.5, 0.5, 0.0), "Enemy"),
            (Point3::new(0.5, -0.5, 0.0), "Wall"),
        ];
        let world = PointCloudWorld::with(points);
        let volume = sample_grid(&two_by_two(), &SensorPose::default(), &world);
        let planar_config = GridSensorConfig {
            world: WorldMode::World2d,
            depth: 3,
            ..two_by_two()
        };
        let planar = sample_grid(&planar_config, &SensorPose::default(), &world);
        assert_eq!(planar.dims(), (1, 2, 2));
        for h in 0..2 {
            for w in 0..2 {
                assert_eq!(planar.get(0, h, w), volume.get(0, h, w));
            }
        }
        assert_eq!(planar.get(1, 0, 0), None);
    }

    #[test]
    fn repeated_passes_are_identical() {
        let world = PointCloudWorld::with(vec![(Point3::new(0.5, -0.5, 0.0), "Enemy")]);
        let mut sensor = GridSensor::new(two_by_two()).unwrap();
        sensor.sample(&SensorPose::default(), &world);
        let first = sensor.observations_vector().unwrap();
        sensor.sample(&SensorPose::default(), &world);
        assert_eq!(first, sensor.observations_vector().unwrap());
    }

    #[test]
    fn deeper_layers_follow_the_first_in_the_vector() {
        let world = PointCloudWorld::with(vec![(Point3::new(-0.5, -0.5, 0.5), "Enemy")]);
        let config = GridSensorConfig {
            depth: 2,
            ..two_by_two()
        };
        let mut sensor = GridSensor::new(config).unwrap();
        let grid = sensor.sample(&SensorPose::default(), &world);
        assert!(grid.get(1, 0, 0).is_some_and(|c| c.overlapped_tagged_object));
        assert!(!grid.get(0, 0, 0).is_some_and(|c| c.has_overlap));

        let vector = sensor.observations_vector().unwrap();
        assert_eq!(vector.len(), 24);
        assert_eq!(&vector[12..15], &[1.0f32, 1.0, 0.0]);
        for (slot, cell) in vector.chunks(3).enumerate().filter(|(slot, _)| *slot != 4) {
            assert_eq!(cell, &[0.0f32, 0.0, -1.0], "cell slot {slot}");
        }
    }

    #[test]
    fn reconfiguring_resizes_the_stored_observation() {
        let world = PointCloudWorld::with(vec![(Point3::new(0.5, 0.5, 0.0), "Enemy")]);
        let mut sensor = GridSensor::new(two_by_two()).unwrap();
        sensor.sample(&SensorPose::default(), &world);
        sensor
            .set_config(GridSensorConfig {
                width: 3,
                ..two_by_two()
            })
            .unwrap();
        assert_eq!(sensor.observation_grid().dims(), (1, 2, 3));
        assert_eq!(
            sensor.observations_vector().unwrap().len(),
            sensor.observation_dim()
        );
        assert!(sensor.observation_grid().cells().iter().all(|c| !c.has_overlap));
    }

    #[test]
    fn rejects_degenerate_lattices() {
        let zero_width = GridSensorConfig {
            width: 0,
            ..Default::default()
        };
        assert!(GridSensor::new(zero_width).is_err());
        let oversized_cast = GridSensorConfig {
            cast_scale: 1.5,
            ..Default::default()
        };
        assert!(oversized_cast.validate().is_err());
    }
}
