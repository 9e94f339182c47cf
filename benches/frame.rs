//! Benchmarks for the CPU side of a frame.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use gravfield::integrator::integrate;
use gravfield::render::render;
use gravfield::solver::solve;
use gravfield::{Attractor, DrawList, FieldConfig, ParticleStore, RasterCanvas, Vec2, Viewport};

const SIZE: Vec2 = Vec2::new(1280.0, 720.0);

fn store(count: usize) -> ParticleStore {
    let mut rng = StdRng::seed_from_u64(42);
    ParticleStore::seed(count, SIZE, &mut rng)
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("solve");
    let config = FieldConfig::default();
    let attractor = Attractor::new(SIZE * 0.5, 1.0);

    for count in [80, 120, 300] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut particles = store(count).as_slice().to_vec();
            b.iter(|| {
                solve(black_box(&mut particles), &attractor, SIZE, &config.physics);
                integrate(&mut particles, &config.physics);
            })
        });
    }

    group.finish();
}

fn bench_draw_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_draw_list");
    let config = FieldConfig::default();

    for count in [80, 120, 300] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let particles = store(count);
            let mut list = DrawList::new();
            b.iter(|| {
                render(black_box(particles.as_slice()), &config.render, &mut list);
                black_box(list.commands().len())
            })
        });
    }

    group.finish();
}

fn bench_raster(c: &mut Criterion) {
    let config = FieldConfig::default();
    let particles = store(config.particle_count);
    let mut canvas = RasterCanvas::new(Viewport::new(SIZE.x, SIZE.y, 1.0));

    c.bench_function("render_raster_80", |b| {
        b.iter(|| render(black_box(particles.as_slice()), &config.render, &mut canvas))
    });
}

criterion_group!(benches, bench_solve, bench_draw_list, bench_raster);
criterion_main!(benches);
