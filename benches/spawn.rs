use criterion::*;
use std::hint::black_box;

use columnar_ecs::prelude::*;

mod common;
use common::*;

fn spawn_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("spawn");

    group.bench_function("create_batch_10k", |b| {
        b.iter_batched(
            World::new,
            |world| {
                let entities = world.create_batch(AGENTS_SMALL).unwrap();
                black_box(entities.len());
                world
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("spawn_with_components_10k", |b| {
        b.iter_batched(
            World::new,
            |world| {
                populate(&world, AGENTS_SMALL).unwrap();
                world
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("migration_churn_10k", |b| {
        b.iter_batched(
            || {
                let world = World::new();
                let entities = populate(&world, AGENTS_SMALL).unwrap();
                (world, entities)
            },
            |(world, entities)| {
                for &e in &entities {
                    world.add(e, Health { hp: 100 }).unwrap();
                }
                for &e in &entities {
                    world.remove::<(Health,)>(e).unwrap();
                }
                black_box(world);
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("destroy_batch_10k", |b| {
        b.iter_batched(
            || {
                let world = World::new();
                let entities = populate(&world, AGENTS_SMALL).unwrap();
                (world, entities)
            },
            |(world, entities)| {
                world.destroy_batch(&entities).unwrap();
                black_box(world);
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, spawn_benchmark);
criterion_main!(benches);
