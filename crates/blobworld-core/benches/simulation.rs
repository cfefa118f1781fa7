//! Tick-loop benchmarks: one fixed step of the whole engine, and the
//! resource search it leans on.

use blobworld_core::prelude::*;
use blobworld_logic::search::locate_resource;
use blobworld_logic::surface::{Resource, TileId};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn engine_with(blobs_per_planet: u32) -> SimulationEngine {
    let mut engine = SimulationEngine::new(WorldConfig {
        blobs_per_planet,
        ..Default::default()
    });
    if let Err(e) = engine.generate(7) {
        panic!("generation failed: {}", e);
    }
    engine
}

fn bench_engine_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine_step");

    for blobs in [10u32, 50, 200].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(blobs), blobs, |b, &n| {
            let mut engine = engine_with(n);
            let step = engine.config().fixed_step;
            b.iter(|| engine.update(black_box(step)));
        });
    }

    group.finish();
}

fn bench_locate_resource(c: &mut Criterion) {
    let engine = engine_with(0);
    let Some(&planet) = engine.bodies().get(1) else {
        return;
    };
    let Ok(planet) = engine.world.get::<&Planet>(planet) else {
        return;
    };
    let surface = planet.surface.clone();
    drop(planet);

    let mut group = c.benchmark_group("locate_resource");
    for radius in [4u32, 12, 24].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(radius), radius, |b, &r| {
            b.iter(|| locate_resource(&surface, black_box(TileId(0)), Resource::Water, r));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_engine_step, bench_locate_resource);
criterion_main!(benches);
