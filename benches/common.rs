#![allow(dead_code)]

use columnar_ecs::prelude::*;

pub const AGENTS_SMALL: usize = 10_000;
pub const AGENTS_MED: usize = 100_000;

#[derive(Clone, Copy, Debug, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Wealth {
    pub value: f64,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Health {
    pub hp: i32,
}

pub fn populate(world: &World, count: usize) -> EcsResult<Vec<Entity>> {
    let entities = world.create_batch(count)?;
    for &e in &entities {
        world.insert::<(Position, Velocity, Wealth)>(e)?;
    }
    Ok(entities)
}
