//! # Entity Management
//!
//! This module defines entity identity, lifecycle, and the table mapping
//! live entities to their storage locations.
//!
//! ## Entity Model
//! An [`Entity`] is a compact, versioned handle composed of:
//!
//! - An **index**, identifying a dense slot that is reused after destruction
//! - A **generation**, bumped on destruction so stale handles compare
//!   unequal to the slot's current occupant
//!
//! This layout allows fast validation and prevents use-after-free bugs when
//! entities are destroyed and their slots reused.
//!
//! ## Location Tracking
//! The [`EntityTable`] keeps, parallel to the generation vector, an optional
//! [`EntityLocation`] per slot pointing at the entity's current archetype
//! and row. A live entity always has a location (newly created entities sit
//! in the empty-signature archetype); destroyed slots have none.
//!
//! ## Invariants
//! - An entity is alive iff its index is in range, its generation matches
//!   the slot generation, and the slot has a location.
//! - Locations always reflect the actual archetype row; they are rewritten
//!   in the same operation as any row move.
//! - Free indices always refer to dead slots.
//!
//! ## Concurrency
//! The table is not internally synchronized; the world facade serializes
//! access through its single lock.

use crate::engine::types::{ArchetypeId, RowId};

/// Opaque, versioned identifier for an entity.
///
/// Two handles with the same index but different generations refer to
/// different entity lifetimes. Handles are cheap to copy and compare and are
/// safe to pass across threads.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Entity {
    /// Dense slot number, reused after destruction.
    pub index: u32,
    /// Bumped on destruction; stale handles compare unequal.
    pub generation: u32,
}

impl Entity {
    /// Reserved sentinel denoting "no entity".
    ///
    /// Note the very first entity ever created also carries `(0, 0)` until
    /// its slot is first destroyed; liveness checks go through
    /// [`EntityTable::alive`], never through comparison with this constant.
    pub const INVALID: Entity = Entity { index: 0, generation: 0 };
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Physical storage location of a live entity.
///
/// ## Invariants
/// - Must always reflect the true row of the entity's component data.
/// - Updated in the same operation as any archetype row move.
/// - Cleared on destruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityLocation {
    /// Archetype containing the entity.
    pub archetype: ArchetypeId,

    /// Row index within the archetype.
    pub row: RowId,
}

/// Slot-based entity pool with generation tracking and location metadata.
///
/// ## Design
/// - Entities are allocated from a free list of indices; the generation
///   vector grows when the free list is empty.
/// - Generations are incremented on destruction to invalidate stale
///   handles.
/// - `locations[i]` is `Some` exactly while slot `i` is alive.
#[derive(Default)]
pub struct EntityTable {
    generations: Vec<u32>,
    free: Vec<u32>,
    locations: Vec<Option<EntityLocation>>,
}

impl EntityTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates an entity slot.
    ///
    /// Reuses a freed slot if available (keeping its bumped generation),
    /// otherwise extends the table with a fresh slot at generation `0`. The
    /// caller is responsible for installing a location before the entity is
    /// observable; until then the slot reports not-alive.
    pub fn allocate(&mut self) -> Entity {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                self.locations.push(None);
                index
            }
        };
        Entity { index, generation: self.generations[index as usize] }
    }

    /// Destroys an entity, invalidating its handle.
    ///
    /// Returns `false` for stale or dead handles. On success the slot's
    /// generation is bumped, its location cleared, and the index returned to
    /// the free list.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.alive(entity) {
            return false;
        }
        let index = entity.index as usize;
        self.generations[index] = self.generations[index].wrapping_add(1);
        self.locations[index] = None;
        self.free.push(entity.index);
        true
    }

    /// Returns `true` if the handle refers to a live entity.
    #[inline]
    pub fn alive(&self, entity: Entity) -> bool {
        let index = entity.index as usize;
        index < self.generations.len()
            && self.generations[index] == entity.generation
            && self.locations[index].is_some()
    }

    /// Returns the location of a live entity.
    #[inline]
    pub fn location(&self, entity: Entity) -> Option<EntityLocation> {
        let index = entity.index as usize;
        if index < self.generations.len() && self.generations[index] == entity.generation {
            self.locations[index]
        } else {
            None
        }
    }

    /// Installs or rewrites the location for an entity slot.
    ///
    /// Callers must only do this for the slot's current occupant, in the
    /// same operation that moved the row.
    #[inline]
    pub fn set_location(&mut self, entity: Entity, location: EntityLocation) {
        debug_assert!(
            (entity.index as usize) < self.generations.len()
                && self.generations[entity.index as usize] == entity.generation,
            "set_location on stale entity {entity:?}"
        );
        if let Some(slot) = self.locations.get_mut(entity.index as usize) {
            *slot = Some(location);
        }
    }

    /// Rewrites only the row of an entity's location.
    ///
    /// Used when a swap-remove relocates a neighboring entity within its
    /// archetype.
    #[inline]
    pub fn set_row(&mut self, entity: Entity, row: RowId) {
        if let Some(Some(location)) = self.locations.get_mut(entity.index as usize) {
            location.row = row;
        }
    }

    /// Number of live entities.
    #[inline]
    pub fn live_count(&self) -> usize {
        self.generations.len() - self.free.len()
    }

    /// Number of slots ever allocated, live or free.
    #[inline]
    pub fn slot_count(&self) -> usize {
        self.generations.len()
    }
}
