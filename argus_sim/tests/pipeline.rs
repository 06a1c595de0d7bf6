// argus_sim/tests/pipeline.rs

use std::fs;
use std::path::{Path, PathBuf};

use argus_sim::cli::Cli;
use argus_sim::prelude::*;

const ARENA: &str = r#"
[simulation]
seed = 3
ticks = 3
dt = 0.5

[[world.obstacles]]
tag = "Goal"
color = [0.0, 1.0, 0.0]
shape = { type = "Sphere", center = [0.0, 0.0, 6.0], radius = 1.0 }

[[cameras]]
name = "eye"
follow = "rover"

[[agents]]
name = "rover"
velocity = [0.0, 0.0, 1.0]

[[agents.sensors]]
kind = "Ray"
name = "rays"
config = { rays = 3, field_of_view = 60.0, distance = 10.0, cast_radius = 0.0, detectable_tags = ["Goal"] }

[[agents.sensors]]
kind = "Pixel"
name = "camera"
camera = "eye"
snapshot = true
config = { width = 4, height = 3, capture = "Grayscale" }
"#;

fn cli_for(dir: &Path) -> Cli {
    let scenario = dir.join("arena.toml");
    fs::write(&scenario, ARENA).unwrap();
    Cli {
        scenario,
        ticks: None,
        output: Some(dir.join("observations.toml")),
        snapshot_dir: Some(dir.join("shots")),
        log_level: "warn".into(),
    }
}

#[test]
fn run_writes_observations_and_numbered_snapshots() {
    let tmp = tempfile::tempdir().unwrap();
    let cli = cli_for(tmp.path());

    let log = argus_sim::run(&cli).unwrap();
    assert_eq!(log.ticks.len(), 3);
    assert_eq!(log.snapshots, vec![tmp.path().join("shots").join("Frame1.ppm")]);

    // Grayscale captures emit three channels per pixel.
    let camera = log.find(2, "rover", "camera").unwrap();
    assert_eq!(camera.values.len(), 3 * 4 * 3);
    assert_eq!(camera.advertised_dim, 4 * 3);
    assert!(camera.error.is_none());

    // Only the centre ray of the fan sees the goal.
    let rays = log.find(0, "rover", "rays").unwrap();
    let hits: Vec<f32> = rays.values.chunks(4).map(|r| r[0]).collect();
    assert_eq!(hits, vec![0.0, 1.0, 0.0]);
    assert_eq!(rays.values[4 + 3], 0.0);

    let dump = fs::read_to_string(tmp.path().join("observations.toml")).unwrap();
    let parsed: toml::Value = toml::from_str(&dump).unwrap();
    assert_eq!(parsed["ticks"].as_array().map(Vec::len), Some(3));

    let image = fs::read(tmp.path().join("shots").join("Frame1.ppm")).unwrap();
    assert!(image.starts_with(b"P6\n4 3\n255\n"));
    assert_eq!(image.len(), b"P6\n4 3\n255\n".len() + 4 * 3 * 3);

    // A second run continues the frame numbering.
    let log = argus_sim::run(&cli).unwrap();
    assert_eq!(log.snapshots, vec![tmp.path().join("shots").join("Frame2.ppm")]);
}

#[test]
fn tick_override_wins_over_the_scenario() {
    let tmp = tempfile::tempdir().unwrap();
    let cli = Cli {
        ticks: Some(1),
        output: None,
        ..cli_for(tmp.path())
    };
    let log = argus_sim::run(&cli).unwrap();
    assert_eq!(log.ticks.len(), 1);
    assert!(!tmp.path().join("observations.toml").exists());
}

#[test]
fn showcase_scenario_builds_and_runs() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/scenarios/showcase.toml");
    let mut scenario = load_scenario_str(&fs::read_to_string(path).unwrap()).unwrap();
    scenario.simulation.ticks = 2;
    scenario.simulation.snapshot_dir = None;

    let mut simulation = Simulation::from_config(scenario).unwrap();
    // Four walls, one hazard and twelve scattered obstacles.
    assert_eq!(simulation.world().colliders().len(), 17);

    let log = simulation.run().unwrap();
    let whiskers = log.find(1, "scout", "whiskers").unwrap();
    assert_eq!(whiskers.values.len(), whiskers.dim);
    assert_eq!(whiskers.advertised_dim, (3 + 3) * 7);
    assert!(log
        .ticks
        .iter()
        .flat_map(|t| &t.agents)
        .flat_map(|a| &a.sensors)
        .all(|s| s.error.is_none()));
}
