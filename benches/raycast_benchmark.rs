// benches/raycast_benchmark.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use glam::Vec3;
use portal_engine::engine_lib::intersection::raycast;
use portal_engine::engine_lib::scene_types::{Brush, Scene};
use rand::Rng;

fn create_test_scene(rng: &mut impl Rng, brush_count: usize) -> Scene {
    let mut brushes = Vec::with_capacity(brush_count);
    for _ in 0..brush_count {
        let center = Vec3::new(
            rng.gen_range(-40.0..40.0),
            rng.gen_range(-10.0..30.0),
            rng.gen_range(-40.0..40.0),
        );
        let half = Vec3::new(
            rng.gen_range(0.5..4.0),
            rng.gen_range(0.5..4.0),
            rng.gen_range(0.5..4.0),
        );
        brushes.push(Brush::new(center - half, center + half, Vec3::ONE));
    }
    Scene::new(Vec3::Y, brushes)
}

fn raycast_benchmark_fn(c: &mut Criterion) {
    let mut rng = rand::thread_rng();

    const NUM_RAYS: usize = 100;
    let scene = create_test_scene(&mut rng, 200);
    let mut rays: Vec<(Vec3, Vec3)> = Vec::with_capacity(NUM_RAYS);
    for _ in 0..NUM_RAYS {
        let origin = Vec3::new(
            rng.gen_range(-50.0..50.0),
            rng.gen_range(-5.0..35.0),
            rng.gen_range(-50.0..50.0),
        );
        let dir = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
        .normalize_or_zero();
        rays.push((origin, dir));
    }

    let mut group = c.benchmark_group("RaycastOperations");

    group.bench_function("raycast_200_brushes_100_rays_cycled", |b| {
        let mut ray_iter = rays.iter().cycle();

        b.iter(|| {
            let (origin, dir) = ray_iter.next().unwrap();
            raycast(black_box(&scene), black_box(*origin), black_box(*dir))
        })
    });
    group.finish();
}

criterion_group!(benches, raycast_benchmark_fn);
criterion_main!(benches);
