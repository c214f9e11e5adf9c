//! # columnar_ecs
//!
//! In-process Entity-Component-System data store with archetype-based,
//! cache-friendly columnar storage.
//!
//! ## Design Goals
//! - Archetype-based storage: entities grouped by their exact component set
//! - O(1) structural changes via swap-remove row migration
//! - Bulk typed iteration over matching archetypes, per-row or whole-column
//! - A single serializing world lock; safe to share across threads
//!
//! ## Quick start
//! ```
//! use columnar_ecs::prelude::*;
//!
//! #[derive(Clone, Copy, Default, Debug, PartialEq)]
//! struct Position { x: f32, y: f32 }
//!
//! #[derive(Clone, Copy, Default, Debug, PartialEq)]
//! struct Velocity { dx: f32, dy: f32 }
//!
//! let world = World::new();
//! let e = world.create().unwrap();
//! world.add(e, Position { x: 1.0, y: 2.0 }).unwrap();
//! world.add(e, Velocity { dx: 0.5, dy: 0.0 }).unwrap();
//!
//! world.for_each2::<Position, Velocity>(|p, v| {
//!     p.x += v.dx;
//!     p.y += v.dy;
//! }).unwrap();
//!
//! assert_eq!(world.get::<Position>(e), Some(Position { x: 1.5, y: 2.0 }));
//! ```

#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs)]
#![allow(clippy::module_inception)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use engine::world::{MemoryUsage, World, WorldData};

pub use engine::entity::{Entity, EntityLocation};

pub use engine::component::{
    component_id_of,
    Component,
    ComponentDesc,
    ComponentSet,
};

pub use engine::query::{Query1, Query2, Query3, Query4};

pub use engine::parallel::{
    par_for_each1, par_for_each2, par_for_each3,
    par_for_each_chunk1, par_for_each_chunk2, par_for_each_chunk3,
};

pub use engine::error::{ColumnError, EcsError, EcsResult};

pub use engine::types::{
    ArchetypeId,
    ComponentId,
    Signature,
    MAX_COMPONENTS,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude (Optional but recommended)
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used types.
///
/// Import with:
/// ```rust
/// use columnar_ecs::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        component_id_of,
        Component,
        ComponentSet,
        EcsError,
        EcsResult,
        Entity,
        World,
        WorldData,
    };
}
