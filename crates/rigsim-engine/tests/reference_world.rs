//! Integration test: reference backend world loading, stepping and
//! reproducibility through the public `Engine` / `World` traits.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use approx::assert_relative_eq;
use nalgebra::Vector3;
use rigsim_core::{EngineError, Pose};
use rigsim_engine::reference::BUILTIN_EMPTY_WORLD;
use rigsim_engine::{Engine, EngineOptions, ReferenceEngine, World};

// ── Fixtures ─────────────────────────────────────────────────────────

const NOISY_WORLD: &str = r#"<?xml version="1.0"?>
<sdf version="1.6">
  <world name="noisy">
    <include><uri>model://ground_plane</uri></include>
    <physics type="ode">
      <max_step_size>0.001</max_step_size>
      <real_time_update_rate>0</real_time_update_rate>
      <effort_noise>0.5</effort_noise>
    </physics>
  </world>
</sdf>
"#;

const CART: &str = r#"<sdf version="1.6">
  <model name="cart">
    <pose>0 0 0 0 0 0</pose>
    <link name="body">
      <pose>0 0 0.2 0 0 0</pose>
      <inertial><mass>4</mass></inertial>
    </link>
    <link name="wheel">
      <pose>0.1 0 0.1 -1.5707963267948966 0 0</pose>
      <inertial>
        <mass>0.5</mass>
        <inertia><ixx>0.01</ixx><iyy>0.01</iyy><izz>0.02</izz></inertia>
      </inertial>
    </link>
    <joint name="axle" type="revolute">
      <parent>body</parent>
      <child>wheel</child>
      <axis><xyz>0 0 1</xyz></axis>
    </joint>
  </model>
</sdf>
"#;

/// Writes `files` into a fresh directory under the integration test
/// scratch area and returns that directory.
fn scratch_dir(name: &str, files: &[(&str, &str)]) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    let _ = fs::remove_dir_all(&dir);
    for (rel, text) in files {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, text).unwrap();
    }
    dir
}

fn load(options: EngineOptions, path: &str) -> Box<dyn World> {
    let mut engine = ReferenceEngine::new();
    engine.setup(&options).unwrap();
    engine.load_world(path).unwrap()
}

/// Tests run in parallel, so each caller gets its own media directory.
fn noisy_world(tag: &str) -> Box<dyn World> {
    let media = scratch_dir(tag, &[("worlds/noisy.world", NOISY_WORLD)]);
    load(
        EngineOptions {
            media_paths: vec![media],
            ..EngineOptions::default()
        },
        "worlds/noisy.world",
    )
}

/// Drives the cart's axle with a constant effort and records the wheel
/// joint position after every tick.
fn drive(world: &mut dyn World, seed: u64, ticks: usize) -> Vec<u64> {
    let cart = world.model_by_name("cart").unwrap();
    let axle = world.actuator_by_name(cart, "axle").unwrap();
    world.reseed(seed);
    world.reset().unwrap();
    (0..ticks)
        .map(|_| {
            world.set_actuator_effort(axle, 1.0).unwrap();
            world.run(1).unwrap();
            world.actuator_state(axle).unwrap().position.to_bits()
        })
        .collect()
}

fn with_cart(mut world: Box<dyn World>) -> Box<dyn World> {
    world.insert_model_string(CART).unwrap();
    world.run(1).unwrap();
    world
}

// ── Tests ────────────────────────────────────────────────────────────

#[test]
fn world_is_resolved_against_media_paths() {
    let world = noisy_world("media_resolution");
    assert_eq!(world.name(), "noisy");
    assert_eq!(world.physics().step_size(), Duration::from_millis(1));
    assert_eq!(world.physics().real_time_update_rate(), 0.0);
}

#[test]
fn each_tick_advances_one_step() {
    let mut world = with_cart(noisy_world("tick_clock"));
    world.run(9).unwrap();
    assert_eq!(world.sim_time().as_duration(), Duration::from_millis(10));
    assert_eq!(world.iterations(), 10);
}

#[test]
fn included_model_is_resolved_against_model_paths() {
    let models = scratch_dir("include_models", &[("cart/model.sdf", CART)]);
    let media = scratch_dir(
        "include_media",
        &[(
            "worlds/garage.world",
            r#"<sdf version="1.6"><world name="garage">
                 <include><uri>model://ground_plane</uri></include>
                 <include>
                   <uri>model://cart</uri>
                   <name>parked</name>
                   <pose>2 0 0 0 0 0</pose>
                 </include>
               </world></sdf>"#,
        )],
    );
    let world = load(
        EngineOptions {
            media_paths: vec![media],
            model_paths: vec![models],
            ..EngineOptions::default()
        },
        "worlds/garage.world",
    );
    let parked = world.model_by_name("parked").expect("included model");
    assert!(world.model_by_name("cart").is_none());
    let body = world.body_by_name(parked, "body").unwrap();
    let pose = world.body_state(body).unwrap().pose;
    assert_relative_eq!(pose.position, Vector3::new(2.0, 0.0, 0.2), epsilon = 1e-12);
}

#[test]
fn unresolvable_include_fails_the_load() {
    let media = scratch_dir(
        "missing_include_media",
        &[(
            "worlds/bad.world",
            r#"<sdf version="1.6"><world name="bad">
                 <include><uri>model://unicorn</uri></include>
               </world></sdf>"#,
        )],
    );
    let mut engine = ReferenceEngine::new();
    engine
        .setup(&EngineOptions {
            media_paths: vec![media],
            ..EngineOptions::default()
        })
        .unwrap();
    assert!(matches!(
        engine.load_world("worlds/bad.world"),
        Err(EngineError::WorldLoadFailed { .. })
    ));
}

#[test]
fn equal_seeds_give_identical_noisy_trajectories() {
    let mut world = with_cart(noisy_world("equal_seeds"));
    let first = drive(world.as_mut(), 7, 50);
    let second = drive(world.as_mut(), 7, 50);
    assert_eq!(first, second);
}

#[test]
fn different_seeds_diverge_under_noise() {
    let mut world = with_cart(noisy_world("different_seeds"));
    let a = drive(world.as_mut(), 7, 50);
    let b = drive(world.as_mut(), 8, 50);
    assert_ne!(a, b);
}

#[test]
fn noiseless_world_ignores_the_seed() {
    let mut world = with_cart(load(EngineOptions::default(), BUILTIN_EMPTY_WORLD));
    let a = drive(world.as_mut(), 1, 20);
    let b = drive(world.as_mut(), 2, 20);
    assert_eq!(a, b);
}

#[test]
fn model_pose_moves_every_link() {
    let mut world = with_cart(load(EngineOptions::default(), BUILTIN_EMPTY_WORLD));
    let cart = world.model_by_name("cart").unwrap();
    let pose = Pose::from_position_rpy(Vector3::new(1.0, 2.0, 0.0), Vector3::zeros());
    world.set_model_initial_pose(cart, pose).unwrap();
    world.set_model_pose(cart, pose).unwrap();
    let wheel = world.body_by_name(cart, "wheel").unwrap();
    let state = world.body_state(wheel).unwrap();
    assert_relative_eq!(state.pose.position, Vector3::new(1.1, 2.0, 0.1), epsilon = 1e-12);
    assert_eq!(world.actuator_names(cart).unwrap(), vec!["axle"]);
}
