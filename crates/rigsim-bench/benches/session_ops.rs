//! Criterion benchmarks for session stepping and reset.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::Vector3;
use rigsim_bench::{chain_profile, driving_torques};
use rigsim_session::{Session, SessionConfig, UpdateHooks, AS_FAST_AS_POSSIBLE};
use rigsim_test_utils::fixtures::{empty_test_world, DIFFERENTIAL_DRIVE_SDF};

fn differential_drive() -> Session {
    let mut session = Session::new(SessionConfig {
        world_path: empty_test_world(),
        model_description: DIFFERENTIAL_DRIVE_SDF.to_string(),
        initial_position: Vector3::new(1.0, 2.0, 0.0),
        real_time_update_rate: AS_FAST_AS_POSSIBLE,
        ..SessionConfig::default()
    });
    session.start().unwrap();
    session
}

/// Benchmark: one unpaced tick of the differential-drive model.
fn bench_step_differential_drive(c: &mut Criterion) {
    let mut session = differential_drive();
    session.step().unwrap();

    c.bench_function("step_differential_drive", |b| {
        b.iter(|| {
            session.step().unwrap();
            black_box(session.simulation_time());
        });
    });
}

/// Benchmark: 100 ticks of a 20-link chain with every joint driven from
/// the begin hook.
fn bench_run_for_chain_20(c: &mut Criterion) {
    let mut session = Session::new(chain_profile(20, 42));
    session.start().unwrap();
    let joints: Vec<_> = session
        .actuator_names()
        .unwrap()
        .iter()
        .map(|name| session.actuator(name).unwrap())
        .collect();

    c.bench_function("run_for_100_chain_20", |b| {
        b.iter(|| {
            let mut tick = 0u64;
            session
                .run_for(
                    100,
                    UpdateHooks::new().on_begin(|_| {
                        for (j, joint) in joints.iter().enumerate() {
                            joint.set_torque(driving_torques(tick, j)).unwrap();
                        }
                        tick += 1;
                    }),
                )
                .unwrap();
        });
    });
}

/// Benchmark: reset of the differential-drive model after 10 ticks.
fn bench_reset(c: &mut Criterion) {
    let mut session = differential_drive();

    c.bench_function("reset_after_10_ticks", |b| {
        b.iter(|| {
            for _ in 0..10 {
                session.step().unwrap();
            }
            session.reset().unwrap();
        });
    });
}

/// Benchmark: reading the pose and velocities of one body.
fn bench_body_queries(c: &mut Criterion) {
    let mut session = differential_drive();
    session.step().unwrap();
    let chassis = session.body("chassis").unwrap();

    c.bench_function("body_queries_chassis", |b| {
        b.iter(|| {
            black_box(chassis.world_pose().unwrap());
            black_box(chassis.relative_linear_vel().unwrap());
            black_box(chassis.relative_angular_vel().unwrap());
        });
    });
}

criterion_group!(
    benches,
    bench_step_differential_drive,
    bench_run_for_chain_20,
    bench_reset,
    bench_body_queries
);
criterion_main!(benches);
