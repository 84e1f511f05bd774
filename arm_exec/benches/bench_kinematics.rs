//! # Kinematics Benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arm_lib::{
    kinematics::{bound_within_robot_reach, forward_kinematics, inverse_kinematics},
    motion::{resolve_min_rotation, JointAngle},
};

fn kinematics_benchmark(c: &mut Criterion) {
    // ---- Targets spread over the reachable disk ----

    let targets: Vec<(f64, f64)> = (0..256)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::TAU / 256.0;
            let radius = 0.2 + 1.7 * (i % 16) as f64 / 16.0;
            (radius * angle.cos(), radius * angle.sin())
        })
        .collect();

    c.bench_function("inverse_kinematics", |b| {
        b.iter(|| {
            for (x, y) in targets.iter() {
                black_box(inverse_kinematics(*x, *y, 1.0, 1.0).unwrap());
            }
        })
    });

    // ---- Joint angles over both full turns ----

    let joints: Vec<(f64, f64)> = (0..256)
        .map(|i| {
            let theta1 = i as f64 * std::f64::consts::TAU / 256.0;
            let theta2 = (i % 16) as f64 * std::f64::consts::PI / 16.0;
            (theta1, theta2)
        })
        .collect();

    c.bench_function("forward_kinematics", |b| {
        b.iter(|| {
            for (theta1, theta2) in joints.iter() {
                black_box(forward_kinematics(*theta1, *theta2, 1.0, 1.0));
            }
        })
    });

    // Full path from a Cartesian target to a joint demand
    let current = JointAngle::from_unwrapped(7.0);
    c.bench_function("target_to_demand", |b| {
        b.iter(|| {
            for (x, y) in targets.iter() {
                let (x, y) = bound_within_robot_reach(*x * 1.5, *y * 1.5, 2.0);
                let (theta1, theta2) = inverse_kinematics(x, y, 1.0, 1.0).unwrap();
                black_box(resolve_min_rotation(theta1, &current));
                black_box(resolve_min_rotation(theta2, &current));
            }
        })
    });
}

criterion_group!(benches, kinematics_benchmark);
criterion_main!(benches);
