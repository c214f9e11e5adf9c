use columnar_ecs::prelude::*;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Velocity {
    dx: f32,
    dy: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Health {
    hp: i32,
}

/// Zero-sized tag component.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Dead;

#[test]
fn exclusion_query_skips_tagged_entities() {
    let world = World::new();

    for i in 0..3 {
        let e = world.create().unwrap();
        world.add(e, Position { x: i as f32, y: 0.0 }).unwrap();
        if i == 2 {
            world.insert::<(Dead,)>(e).unwrap();
        }
    }

    let mut visited = 0;
    world
        .query1::<Position>()
        .exclude::<Dead>()
        .each(|_| visited += 1)
        .unwrap();
    assert_eq!(visited, 2);

    // Without the exclusion all three rows match.
    let mut all = 0;
    world.query1::<Position>().each(|_| all += 1).unwrap();
    assert_eq!(all, 3);
}

#[test]
fn chained_exclusions_accumulate() {
    let world = World::new();

    let plain = world.create().unwrap();
    world.add(plain, Position::default()).unwrap();

    let dead = world.create().unwrap();
    world.add(dead, Position::default()).unwrap();
    world.insert::<(Dead,)>(dead).unwrap();

    let moving = world.create().unwrap();
    world.add(moving, Position::default()).unwrap();
    world.add(moving, Velocity { dx: 1.0, dy: 0.0 }).unwrap();

    let mut visited = 0;
    world
        .query1::<Position>()
        .exclude::<Dead>()
        .exclude::<Velocity>()
        .each(|_| visited += 1)
        .unwrap();
    assert_eq!(visited, 1);
}

#[test]
fn chunk_iteration_sees_one_chunk_per_archetype() {
    let world = World::new();

    let entities = world.create_batch(10_000).unwrap();
    for &e in &entities {
        world.insert::<(Position, Velocity)>(e).unwrap();
    }

    let mut invocations = 0;
    let mut rows = 0;
    world
        .for_each_chunk2::<Position, Velocity>(|positions, velocities| {
            invocations += 1;
            assert_eq!(positions.len(), velocities.len());
            rows += positions.len();
        })
        .unwrap();

    assert_eq!(invocations, 1);
    assert_eq!(rows, 10_000);
}

#[test]
fn chunk_counts_match_per_row_visits() {
    let world = World::new();

    // Two matching archetypes: [Position] and [Position, Velocity].
    for i in 0..7 {
        let e = world.create().unwrap();
        world.add(e, Position { x: i as f32, y: 0.0 }).unwrap();
    }
    for _ in 0..5 {
        let e = world.create().unwrap();
        world.insert::<(Position, Velocity)>(e).unwrap();
    }

    let mut chunk_rows = 0;
    let mut chunks = 0;
    world
        .for_each_chunk1::<Position>(|positions| {
            chunks += 1;
            chunk_rows += positions.len();
        })
        .unwrap();

    let mut row_visits = 0;
    world.for_each1::<Position>(|_| row_visits += 1).unwrap();

    assert_eq!(chunks, 2);
    assert_eq!(chunk_rows, row_visits);
    assert_eq!(row_visits, 12);
}

#[test]
fn queries_visit_supersets_exactly_once() {
    let world = World::new();

    let p = world.create().unwrap();
    world.add(p, Position { x: 1.0, y: 0.0 }).unwrap();

    let pv = world.create().unwrap();
    world.insert::<(Position, Velocity)>(pv).unwrap();

    let pvh = world.create().unwrap();
    world.insert::<(Position, Velocity, Health)>(pvh).unwrap();

    let v = world.create().unwrap();
    world.add(v, Velocity { dx: 1.0, dy: 1.0 }).unwrap();

    let _bare = world.create().unwrap();

    let mut visited = 0;
    world
        .for_each2::<Position, Velocity>(|_, _| visited += 1)
        .unwrap();
    assert_eq!(visited, 2); // pv and pvh; never the others
}

#[test]
fn iteration_mutates_values_in_place() {
    let world = World::new();

    let entities = world.create_batch(4).unwrap();
    for (i, &e) in entities.iter().enumerate() {
        world.add(e, Position { x: i as f32, y: 0.0 }).unwrap();
        world.add(e, Velocity { dx: 1.0, dy: 2.0 }).unwrap();
    }

    world
        .for_each2::<Position, Velocity>(|p, v| {
            p.x += v.dx;
            p.y += v.dy;
        })
        .unwrap();

    for (i, &e) in entities.iter().enumerate() {
        assert_eq!(
            world.get::<Position>(e),
            Some(Position { x: i as f32 + 1.0, y: 2.0 })
        );
    }
}

#[test]
fn chunk_slices_are_contiguous_and_aligned() {
    let world = World::new();

    let entities = world.create_batch(256).unwrap();
    for &e in &entities {
        world.insert::<(Position, Velocity)>(e).unwrap();
    }

    world
        .for_each_chunk2::<Position, Velocity>(|positions, velocities| {
            let pos_base = positions.as_ptr() as usize;
            assert_eq!(pos_base % std::mem::align_of::<Position>(), 0);
            for (i, p) in positions.iter().enumerate() {
                let addr = p as *const Position as usize;
                assert_eq!(addr, pos_base + i * std::mem::size_of::<Position>());
            }
            // Columns must not alias.
            assert_ne!(positions.as_ptr() as usize, velocities.as_ptr() as usize);
        })
        .unwrap();
}

#[test]
fn zero_sized_tags_iterate_like_any_component() {
    let world = World::new();

    for _ in 0..3 {
        let e = world.create().unwrap();
        world.insert::<(Dead,)>(e).unwrap();
    }

    let mut visited = 0;
    world.for_each1::<Dead>(|_| visited += 1).unwrap();
    assert_eq!(visited, 3);

    let mut chunk_len = 0;
    world.for_each_chunk1::<Dead>(|tags| chunk_len = tags.len()).unwrap();
    assert_eq!(chunk_len, 3);
}

#[test]
fn duplicate_component_in_one_query_is_rejected() {
    let world = World::new();
    let e = world.create().unwrap();
    world.add(e, Position::default()).unwrap();

    let result = world.for_each2::<Position, Position>(|_, _| {});
    assert!(matches!(result, Err(EcsError::DuplicateQueryComponent { .. })));
}

#[test]
fn empty_archetypes_are_skipped_by_chunk_iteration() {
    let world = World::new();

    let e = world.create().unwrap();
    world.add(e, Position::default()).unwrap();
    // Migrating away leaves the [Position] archetype empty but extant.
    world.add(e, Velocity::default()).unwrap();
    world.remove::<(Position, Velocity)>(e).unwrap();

    let mut invocations = 0;
    world
        .for_each_chunk1::<Position>(|_| invocations += 1)
        .unwrap();
    assert_eq!(invocations, 0);
}
