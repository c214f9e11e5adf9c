use criterion::*;
use std::hint::black_box;

use columnar_ecs::prelude::*;
use columnar_ecs::par_for_each_chunk2;

mod common;
use common::*;

fn iterate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");

    group.bench_function("for_each_integrate_100k", |b| {
        b.iter_batched(
            || {
                let world = World::new();
                populate(&world, AGENTS_MED).unwrap();
                world
            },
            |world| {
                world
                    .for_each2::<Position, Velocity>(|p, v| {
                        p.x += v.dx;
                        p.y += v.dy;
                    })
                    .unwrap();
                black_box(world);
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("for_each_chunk_integrate_100k", |b| {
        b.iter_batched(
            || {
                let world = World::new();
                populate(&world, AGENTS_MED).unwrap();
                world
            },
            |world| {
                world
                    .for_each_chunk2::<Position, Velocity>(|positions, velocities| {
                        for (p, v) in positions.iter_mut().zip(velocities.iter()) {
                            p.x += v.dx;
                            p.y += v.dy;
                        }
                    })
                    .unwrap();
                black_box(world);
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("par_for_each_chunk_integrate_100k", |b| {
        b.iter_batched(
            || {
                let world = World::new();
                populate(&world, AGENTS_MED).unwrap();
                world
            },
            |world| {
                par_for_each_chunk2::<Position, Velocity>(&world, |positions, velocities| {
                    for (p, v) in positions.iter_mut().zip(velocities.iter()) {
                        p.x += v.dx;
                        p.y += v.dy;
                    }
                })
                .unwrap();
                black_box(world);
            },
            BatchSize::LargeInput,
        );
    });

    group.bench_function("query_exclude_100k", |b| {
        b.iter_batched(
            || {
                let world = World::new();
                let entities = populate(&world, AGENTS_MED).unwrap();
                for &e in entities.iter().step_by(2) {
                    world.add(e, Health { hp: 1 }).unwrap();
                }
                world
            },
            |world| {
                let mut total = 0.0f64;
                world
                    .query1::<Wealth>()
                    .exclude::<Health>()
                    .each(|w| total += w.value)
                    .unwrap();
                black_box(total);
                black_box(world);
            },
            BatchSize::LargeInput,
        );
    });

    group.finish();
}

criterion_group!(benches, iterate_benchmark);
criterion_main!(benches);
