// argus_sim/src/simulation/world/spawner.rs

//! Builds a [`SceneWorld`] from the `[world]` section of a scenario.

use argus_core::prelude::Rgba;
use nalgebra::{Point3, Vector3};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::simulation::config::structs::{ObstacleConfig, ScatterConfig, ShapeConfig, World};
use crate::simulation::world::{Collider, SceneWorld, Shape};

pub fn rgb(color: [f32; 3]) -> Rgba {
    Rgba::new(color[0], color[1], color[2], 1.0)
}

pub fn collider_from_config(config: &ObstacleConfig) -> Collider {
    let shape = match &config.shape {
        ShapeConfig::Sphere { center, radius } => Shape::Sphere {
            center: Point3::from(*center),
            radius: *radius,
        },
        ShapeConfig::Cuboid {
            center,
            half_extents,
        } => Shape::Cuboid {
            center: Point3::from(*center),
            half_extents: Vector3::from(*half_extents),
        },
    };
    Collider::new(shape, config.tag.clone())
        .on_layer(config.layer)
        .with_color(rgb(config.color))
}

/// Draws `config.count` spheres inside the scatter region.
pub fn scatter<R: Rng>(config: &ScatterConfig, rng: &mut R) -> Vec<Collider> {
    let [lo, hi] = config.radius_range;
    let (r_min, r_max) = (lo.min(hi), lo.max(hi));
    let extent = Vector3::from(config.extent).abs();

    (0..config.count)
        .map(|_| {
            let center = Point3::new(
                rng.gen_range(-extent.x..=extent.x),
                rng.gen_range(-extent.y..=extent.y),
                rng.gen_range(-extent.z..=extent.z),
            );
            let radius = rng.gen_range(r_min..=r_max);
            let tag = config
                .tags
                .choose(rng)
                .cloned()
                .unwrap_or_else(|| "Untagged".to_string());
            let color = Rgba::new(
                rng.gen_range(0.2..=1.0),
                rng.gen_range(0.2..=1.0),
                rng.gen_range(0.2..=1.0),
                1.0,
            );
            Collider::new(Shape::Sphere { center, radius }, tag)
                .on_layer(config.layer)
                .with_color(color)
        })
        .collect()
}

/// Places the listed obstacles, then any scattered ones. Unseeded runs pick a
/// random seed and log it so the layout can be reproduced.
pub fn build_world(config: &World, seed: Option<u64>) -> SceneWorld {
    let mut world = SceneWorld::new(rgb(config.background));
    for obstacle in &config.obstacles {
        world.add_collider(collider_from_config(obstacle));
    }

    if let Some(scatter_config) = &config.scatter {
        let seed = seed.unwrap_or_else(rand::random);
        info!("Scattering {} obstacles with seed {}", scatter_config.count, seed);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        for collider in scatter(scatter_config, &mut rng) {
            world.add_collider(collider);
        }
    }

    debug!("World built with {} colliders", world.colliders().len());
    world
}
