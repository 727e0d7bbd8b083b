//! Simulation benchmarks
//!
//! Benchmarks one adaptive solver interval and a full closed-loop run.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nalgebra::DVector;
use pidsim::solvers::{integrate_interval, Solver, RKF45};
use pidsim::{run_simulation, NoiseSource, PidGains, ProcessModel, MIN_HORIZON};

/// One unit interval of first-order lag dynamics
fn bench_rkf45_interval(c: &mut Criterion) {
    c.bench_function("RKF45 unit interval", |b| {
        b.iter(|| {
            let mut solver = RKF45::new(DVector::from_vec(vec![13.115]));
            integrate_interval(
                &mut solver,
                |x, _t| DVector::from_vec(vec![(-(x[0] - 13.115) + 2.25 * 50.0) / 60.5]),
                0.0,
                1.0,
                black_box(1.0),
            )
            .unwrap();
            solver.state()[0]
        });
    });
}

/// Full 600-step closed-loop run at the reference scenario
fn bench_full_run(c: &mut Criterion) {
    let model = ProcessModel::new(2.25, 60.5, 9.99);
    let gains = PidGains {
        kp: 1.1,
        ki: 0.1,
        kd: 0.09,
    };
    let noise = NoiseSource::uniform(MIN_HORIZON, 42);

    c.bench_function("run_simulation 600 steps", |b| {
        b.iter(|| run_simulation(black_box(&model), black_box(&gains), &noise).unwrap());
    });
}

criterion_group!(benches, bench_rkf45_interval, bench_full_run);
criterion_main!(benches);
