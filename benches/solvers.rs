use ar3::{
    fractal::{FractalOptions, FractalSampler},
    nalgebra as na,
    testing::*,
    Ar3, RegularizationPolicy, RunConfig,
};
use criterion::{criterion_group, criterion_main, Criterion};

fn run<F, P>(f: &F, solver: &Ar3<P>, x: &na::DVector<f64>) -> bool
where
    F: TestObjective,
    P: RegularizationPolicy,
{
    let result = solver.run(f, x);
    result.converged() && f.is_optimum(result.x(), 1e-4)
}

fn config() -> RunConfig {
    let mut config = RunConfig::default();
    config.set_max_iterations(1000);
    config
}

fn rosenbrock(c: &mut Criterion) {
    let f = Rosenbrock::default();
    let x = &f.initials()[0];

    let ar3 = Ar3::with_config(config()).unwrap();
    let unregularized = Ar3::unregularized(config()).unwrap();

    c.bench_function("AR3 rosenbrock", |b| b.iter(|| run(&f, &ar3, x)));

    c.bench_function("Unregularized rosenbrock", |b| {
        b.iter(|| run(&f, &unregularized, x))
    });
}

fn himmelblau(c: &mut Criterion) {
    let f = Himmelblau;
    let x = &f.initials()[0];

    let ar3 = Ar3::with_config(config()).unwrap();

    c.bench_function("AR3 himmelblau", |b| b.iter(|| run(&f, &ar3, x)));
}

fn double_well(c: &mut Criterion) {
    let f = DoubleWell;
    let x = &f.initials()[0];

    let ar3 = Ar3::with_config(config()).unwrap();

    c.bench_function("AR3 double well (indefinite start)", |b| {
        b.iter(|| run(&f, &ar3, x))
    });
}

fn fractal(c: &mut Criterion) {
    let mut options = FractalOptions::default();
    options.set_x_points(20).set_y_points(20);
    let sampler = FractalSampler::new(options).unwrap();

    c.bench_function("fractal dataset double well 20x20", |b| {
        b.iter(|| sampler.dataset(&DoubleWell, &RunConfig::default()).unwrap())
    });
}

criterion_group!(benches, rosenbrock, himmelblau, double_well, fractal);
criterion_main!(benches);
