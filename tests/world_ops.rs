use columnar_ecs::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

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
struct GameTime {
    delta: f32,
    total: f32,
}

#[test]
fn create_add_iterate() {
    init_tracing();
    let world = World::new();

    let e1 = world.create().unwrap();
    let e2 = world.create().unwrap();
    assert!(world.alive(e1));
    assert!(world.alive(e2));

    world.add(e1, Position { x: 1.0, y: 2.0 }).unwrap();
    world.insert::<(Position, Velocity)>(e2).unwrap();

    let mut visited = Vec::new();
    world
        .for_each1::<Position>(|p| visited.push(*p))
        .unwrap();

    assert_eq!(visited.len(), 2);
    assert!(visited.contains(&Position { x: 1.0, y: 2.0 }));
    assert!(visited.contains(&Position { x: 0.0, y: 0.0 }));
}

#[test]
fn generation_reuse_invalidates_old_handle() {
    let world = World::new();

    let e = world.create().unwrap();
    let index = e.index;
    let generation = e.generation;

    world.destroy(e).unwrap();
    assert!(!world.alive(e));

    let e2 = world.create().unwrap();
    assert_eq!(e2.index, index);
    assert_eq!(e2.generation, generation + 1);
    assert!(!world.alive(e));
    assert!(world.alive(e2));
}

#[test]
fn destroy_is_idempotent_and_stale_safe() {
    let world = World::new();

    let e = world.create().unwrap();
    world.add(e, Position { x: 3.0, y: 4.0 }).unwrap();
    world.destroy(e).unwrap();

    // Destroying again, or operating on the stale handle, is a no-op.
    world.destroy(e).unwrap();
    world.add(e, Position { x: 9.0, y: 9.0 }).unwrap();
    world.remove::<(Position,)>(e).unwrap();
    assert_eq!(world.get::<Position>(e), None);
    assert!(!world.has::<Position>(e));
    assert_eq!(world.entity_count().unwrap(), 0);
}

#[test]
fn foreign_handles_read_as_dead() {
    let world = World::new();
    let _ = world.create().unwrap();
    let e = world.create().unwrap();
    world.destroy(e).unwrap();

    // A handle that was never issued by this world reads as dead.
    let bogus = Entity { index: 4_000_000, generation: 7 };
    assert!(!world.alive(bogus));
    assert_eq!(world.get::<Position>(bogus), None);
}

#[test]
fn create_batch_and_destroy_batch() {
    let world = World::new();

    let entities = world.create_batch(5).unwrap();
    assert_eq!(entities.len(), 5);
    assert_eq!(world.entity_count().unwrap(), 5);
    for &e in &entities {
        assert!(world.alive(e));
        world.add(e, Position::default()).unwrap();
    }

    world.destroy_batch(&entities).unwrap();
    assert_eq!(world.entity_count().unwrap(), 0);
    for &e in &entities {
        assert!(!world.alive(e));
    }
}

#[test]
fn fresh_entities_live_in_the_empty_archetype() {
    let world = World::new();
    let e = world.create().unwrap();

    assert_eq!(world.archetype_count().unwrap(), 1);
    world
        .with(|data| {
            let archetype = &data.archetypes()[0];
            assert!(archetype.signature().is_empty());
            assert_eq!(archetype.entities(), &[e]);
        })
        .unwrap();
}

#[test]
fn resources_install_replace_and_mutate() {
    let world = World::new();
    assert!(!world.has_resource::<GameTime>());
    assert!(matches!(
        world.get_resource_cloned::<GameTime>(),
        Err(EcsError::ResourceAbsent { .. })
    ));

    world.set_resource(GameTime { delta: 0.016, total: 0.0 }).unwrap();
    assert!(world.has_resource::<GameTime>());

    for _ in 0..3 {
        world
            .with_resource(|time: &mut GameTime| time.total += time.delta)
            .unwrap();
    }
    let time = world.get_resource_cloned::<GameTime>().unwrap();
    assert!((time.total - 0.048).abs() < 1e-6);

    // A second install replaces the previous value.
    world.set_resource(GameTime { delta: 1.0, total: 100.0 }).unwrap();
    assert_eq!(world.get_resource_cloned::<GameTime>().unwrap().total, 100.0);
}

#[test]
fn memory_usage_reflects_materialized_columns() {
    let world = World::new();

    let entities = world.create_batch(100).unwrap();
    for &e in &entities {
        world.insert::<(Position, Velocity)>(e).unwrap();
    }

    let usage = world.memory_usage().unwrap();
    assert_eq!(usage.entities, 100);
    // Empty-signature archetype plus the Position+Velocity archetype.
    assert_eq!(usage.archetypes, 2);
    assert_eq!(
        usage.component_bytes,
        100 * (std::mem::size_of::<Position>() + std::mem::size_of::<Velocity>())
    );
    assert!(usage.entity_metadata_bytes > 0);

    let report = format!("{usage}");
    assert!(report.contains("Entities: 100"));
    assert!(report.contains("Archetypes: 2"));
}

#[test]
fn entity_display_shows_index_and_generation() {
    let world = World::new();
    let e = world.create().unwrap();
    assert_eq!(format!("{e}"), "0v0");
}
