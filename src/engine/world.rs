//! # World: archetype index, migration engine, and the locked facade
//!
//! This module owns the two layers of the store:
//!
//! - [`WorldData`] — the unsynchronized core: the entity table, the
//!   archetype vector and its signature index, the resource store, and the
//!   event bus. All structural operations, including the migration engine
//!   that moves an entity's row between archetypes, live here.
//! - [`World`] — the public facade: a [`WorldData`] behind a single
//!   serializing mutex. Every public operation locks, executes, and
//!   unlocks, which makes the facade safe to share across threads and
//!   linearizes all operations.
//!
//! ## Migration
//!
//! Changing an entity's component set moves its row from its current
//! archetype to the archetype of the new signature:
//!
//! 1. the destination archetype is resolved (created on first demand) and
//!    its columns are materialized,
//! 2. the entity is appended to the destination, shared component values
//!    are moved across, newly introduced components are
//!    default-constructed,
//! 3. the vacated source row is swap-removed and the relocated neighbor's
//!    location is rewritten,
//! 4. the entity's own location is rewritten,
//! 5. lifecycle callbacks fire for the components that actually changed.
//!
//! Destination pushes happen before any source mutation, so an allocation
//! failure cannot leave the source archetype inconsistent.
//!
//! ## Re-entrancy
//!
//! Iteration and event callbacks execute while the world lock is held.
//! Calling back into the [`World`] facade from inside a callback deadlocks;
//! callbacks should confine themselves to the data they were handed.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::engine::archetype::Archetype;
use crate::engine::component::{component_id_of, Component, ComponentSet};
use crate::engine::entity::{Entity, EntityLocation, EntityTable};
use crate::engine::error::{ColumnError, EcsError, EcsResult};
use crate::engine::events::EventBus;
use crate::engine::resource::ResourceStore;
use crate::engine::storage::{downcast_column, downcast_column_mut};
use crate::engine::types::{ArchetypeId, ComponentId, RowId, Signature, SIGNATURE_WORDS};

/// Returns mutable references to two distinct archetypes of the same world.
fn archetype_pair_mut(
    archetypes: &mut [Archetype],
    a: ArchetypeId,
    b: ArchetypeId,
) -> (&mut Archetype, &mut Archetype) {
    debug_assert!(a != b, "source and destination archetype must differ");
    let (low, high) = if a < b { (a, b) } else { (b, a) };
    let (head, tail) = archetypes.split_at_mut(high as usize);
    let low_ref = &mut head[low as usize];
    let high_ref = &mut tail[0];
    if a < b {
        (low_ref, high_ref)
    } else {
        (high_ref, low_ref)
    }
}

/// The unsynchronized core of the store.
///
/// Reachable through [`World::with`], which hands out exclusive access
/// under the world lock. Methods here return real references
/// (`get`, `get_resource`), which the locked facade cannot.
#[derive(Default)]
pub struct WorldData {
    entities: EntityTable,
    archetypes: Vec<Archetype>,
    archetype_index: HashMap<[u64; SIGNATURE_WORDS], ArchetypeId>,
    resources: ResourceStore,
    events: EventBus,
}

impl WorldData {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the archetype for `signature`, creating it on first demand.
    ///
    /// Column slots of a fresh archetype stay empty until the first
    /// migration in.
    pub(crate) fn get_or_create_archetype(&mut self, signature: Signature) -> ArchetypeId {
        if let Some(&id) = self.archetype_index.get(&signature.words) {
            return id;
        }
        let id = self.archetypes.len() as ArchetypeId;
        self.archetype_index.insert(signature.words, id);
        self.archetypes.push(Archetype::new(id, signature));
        tracing::debug!(archetype = id, components = signature.len(), "created archetype");
        id
    }

    /// All archetypes, in creation order.
    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    pub(crate) fn archetypes_mut(&mut self) -> &mut [Archetype] {
        &mut self.archetypes
    }

    // ------------------------------------------------------------------
    // Entity lifecycle
    // ------------------------------------------------------------------

    /// Creates a live entity in the empty-signature archetype.
    pub fn create(&mut self) -> Entity {
        let entity = self.entities.allocate();
        let empty = self.get_or_create_archetype(Signature::empty());
        let row = self.archetypes[empty as usize].push_entity(entity);
        self.entities
            .set_location(entity, EntityLocation { archetype: empty, row: row as RowId });
        entity
    }

    /// Creates `count` fresh entities.
    pub fn create_batch(&mut self, count: usize) -> Vec<Entity> {
        let mut entities = Vec::with_capacity(count);
        for _ in 0..count {
            entities.push(self.create());
        }
        entities
    }

    /// Destroys an entity, dropping its component values.
    ///
    /// Stale or dead handles are a no-op. The slot generation is bumped so
    /// the destroyed handle never reads as alive again.
    pub fn destroy(&mut self, entity: Entity) -> EcsResult<()> {
        let Some(location) = self.entities.location(entity) else {
            return Ok(());
        };
        let archetype = &mut self.archetypes[location.archetype as usize];
        let moved = archetype.swap_remove_row(location.row as usize)?;
        if let Some(moved) = moved {
            self.entities.set_row(moved, location.row);
        }
        self.entities.destroy(entity);
        Ok(())
    }

    /// Destroys each entity in `entities`, in order.
    pub fn destroy_batch(&mut self, entities: &[Entity]) -> EcsResult<()> {
        for &entity in entities {
            self.destroy(entity)?;
        }
        Ok(())
    }

    /// Returns `true` if the handle refers to a live entity.
    pub fn alive(&self, entity: Entity) -> bool {
        self.entities.alive(entity)
    }

    // ------------------------------------------------------------------
    // Migration engine
    // ------------------------------------------------------------------

    /// Moves `entity` to the archetype of its signature with `add` set and
    /// `remove` cleared.
    ///
    /// ## Edge cases
    /// - dead entity: no-op;
    /// - resulting signature unchanged (adding present components, removing
    ///   absent ones): no-op, no callbacks;
    /// - `on_add` fires for components actually added, then `on_remove` for
    ///   components actually removed, ascending id order, after the
    ///   transition has committed.
    pub(crate) fn migrate(
        &mut self,
        entity: Entity,
        add: &[ComponentId],
        remove: &[ComponentId],
    ) -> EcsResult<()> {
        let Some(location) = self.entities.location(entity) else {
            return Ok(());
        };
        let src_id = location.archetype;
        let src_row = location.row as usize;
        let src_sig = *self.archetypes[src_id as usize].signature();

        let mut dst_sig = src_sig;
        for &component_id in add {
            dst_sig.set(component_id);
        }
        for &component_id in remove {
            dst_sig.clear(component_id);
        }
        if dst_sig == src_sig {
            return Ok(());
        }

        let dst_id = self.get_or_create_archetype(dst_sig);
        for component_id in dst_sig.iter() {
            self.archetypes[dst_id as usize].ensure_column(component_id)?;
        }

        let (src, dst) = archetype_pair_mut(&mut self.archetypes, src_id, dst_id);
        let dst_row = dst.push_entity(entity);
        src.move_row_to(dst, src_row)?;
        let moved = src.swap_remove_entity(src_row);

        if let Some(moved) = moved {
            self.entities.set_row(moved, src_row as RowId);
        }
        self.entities
            .set_location(entity, EntityLocation { archetype: dst_id, row: dst_row as RowId });

        for component_id in dst_sig.iter() {
            if !src_sig.has(component_id) {
                self.events.fire_added(component_id, entity);
            }
        }
        for component_id in src_sig.iter() {
            if !dst_sig.has(component_id) {
                self.events.fire_removed(component_id, entity);
            }
        }

        Ok(())
    }

    // ------------------------------------------------------------------
    // Component access
    // ------------------------------------------------------------------

    /// Adds component `T` to `entity` with `value`.
    ///
    /// If `T` was already present only the value is overwritten; no
    /// migration happens and no callback fires. Dead entities are a no-op.
    pub fn add<T: Component>(&mut self, entity: Entity, value: T) -> EcsResult<()> {
        let component_id = component_id_of::<T>()?;
        self.migrate(entity, &[component_id], &[])?;

        let Some(location) = self.entities.location(entity) else {
            return Ok(());
        };
        let archetype = &mut self.archetypes[location.archetype as usize];
        let column = archetype
            .column_mut(component_id)
            .ok_or(ColumnError::MissingColumn { component_id })?;
        downcast_column_mut::<T>(column)?.set(location.row as usize, value)?;
        Ok(())
    }

    /// Adds every component of the set `S`, default-constructed.
    ///
    /// Components already present keep their values.
    pub fn insert<S: ComponentSet>(&mut self, entity: Entity) -> EcsResult<()> {
        let ids = S::component_ids()?;
        self.migrate(entity, &ids, &[])
    }

    /// Removes every component of the set `S`; absent components are
    /// ignored. The removed values are dropped.
    pub fn remove<S: ComponentSet>(&mut self, entity: Entity) -> EcsResult<()> {
        let ids = S::component_ids()?;
        self.migrate(entity, &[], &ids)
    }

    /// Returns a reference to `entity`'s `T`, if alive and present.
    pub fn get<T: Component>(&self, entity: Entity) -> Option<&T> {
        let location = self.entities.location(entity)?;
        let component_id = component_id_of::<T>().ok()?;
        let archetype = self.archetypes.get(location.archetype as usize)?;
        let column = archetype.column(component_id)?;
        downcast_column::<T>(column).ok()?.get(location.row as usize)
    }

    /// Returns a mutable reference to `entity`'s `T`, if alive and present.
    pub fn get_mut<T: Component>(&mut self, entity: Entity) -> Option<&mut T> {
        let location = self.entities.location(entity)?;
        let component_id = component_id_of::<T>().ok()?;
        let archetype = self.archetypes.get_mut(location.archetype as usize)?;
        let column = archetype.column_mut(component_id)?;
        downcast_column_mut::<T>(column).ok()?.get_mut(location.row as usize)
    }

    /// Returns `true` if `entity` is alive and carries `T`.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        let Some(location) = self.entities.location(entity) else {
            return false;
        };
        let Ok(component_id) = component_id_of::<T>() else {
            return false;
        };
        self.archetypes[location.archetype as usize].has(component_id)
    }

    // ------------------------------------------------------------------
    // Resources
    // ------------------------------------------------------------------

    /// Installs `value` as the singleton of type `R`, dropping any previous
    /// value.
    pub fn set_resource<R: Component>(&mut self, value: R) -> EcsResult<()> {
        let key = component_id_of::<R>()?;
        self.resources.set(key, value);
        Ok(())
    }

    /// Returns the installed resource of type `R`.
    ///
    /// ## Errors
    /// `ResourceAbsent` when none is installed.
    pub fn get_resource<R: Component>(&self) -> EcsResult<&R> {
        let key = component_id_of::<R>()?;
        self.resources.get(key)
    }

    /// Returns the installed resource of type `R`, mutably.
    ///
    /// ## Errors
    /// `ResourceAbsent` when none is installed.
    pub fn get_resource_mut<R: Component>(&mut self) -> EcsResult<&mut R> {
        let key = component_id_of::<R>()?;
        self.resources.get_mut(key)
    }

    /// Returns `true` if a resource of type `R` is installed.
    pub fn has_resource<R: Component>(&self) -> bool {
        match component_id_of::<R>() {
            Ok(key) => self.resources.has(key),
            Err(_) => false,
        }
    }

    // ------------------------------------------------------------------
    // Events
    // ------------------------------------------------------------------

    /// Subscribes `callback` to fire after `T` is added to any entity.
    pub fn on_component_added<T: Component>(
        &mut self,
        callback: impl Fn(Entity) + Send + Sync + 'static,
    ) -> EcsResult<()> {
        let component_id = component_id_of::<T>()?;
        self.events.subscribe_added(component_id, Box::new(callback));
        Ok(())
    }

    /// Subscribes `callback` to fire after `T` is removed from any entity.
    pub fn on_component_removed<T: Component>(
        &mut self,
        callback: impl Fn(Entity) + Send + Sync + 'static,
    ) -> EcsResult<()> {
        let component_id = component_id_of::<T>()?;
        self.events.subscribe_removed(component_id, Box::new(callback));
        Ok(())
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.live_count()
    }

    /// Number of archetypes created so far.
    pub fn archetype_count(&self) -> usize {
        self.archetypes.len()
    }

    /// Snapshot of the store's memory footprint.
    pub fn memory_usage(&self) -> MemoryUsage {
        let component_bytes: usize =
            self.archetypes.iter().map(Archetype::component_bytes).sum();
        let entity_metadata_bytes = self.entities.slot_count()
            * (std::mem::size_of::<u32>() + std::mem::size_of::<Option<EntityLocation>>());
        MemoryUsage {
            entities: self.entities.live_count(),
            archetypes: self.archetypes.len(),
            component_bytes,
            entity_metadata_bytes,
        }
    }
}

/// Memory footprint report backing `print_memory_usage`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryUsage {
    /// Live entity count.
    pub entities: usize,
    /// Archetypes created so far.
    pub archetypes: usize,
    /// Bytes of component data across all materialized columns.
    pub component_bytes: usize,
    /// Bytes of generation and location metadata.
    pub entity_metadata_bytes: usize,
}

impl std::fmt::Display for MemoryUsage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== ECS Memory Usage ===")?;
        writeln!(f, "Entities: {}", self.entities)?;
        writeln!(f, "Archetypes: {}", self.archetypes)?;
        writeln!(f, "Component data: {:.1} KB", self.component_bytes as f64 / 1024.0)?;
        write!(f, "Entity metadata: {:.1} KB", self.entity_metadata_bytes as f64 / 1024.0)
    }
}

/// Thread-safe entity-component store.
///
/// All public operations serialize through a single internal lock, so a
/// `World` can be shared freely across threads; operations are linearizable
/// in lock-acquisition order.
///
/// Reference-shaped access (component and resource references) cannot cross
/// the lock boundary; use [`World::with`] for an exclusive session against
/// the full [`WorldData`] API.
///
/// Iteration and event callbacks run while the lock is held: re-entering
/// the facade from inside a callback deadlocks.
#[derive(Default)]
pub struct World {
    data: Mutex<WorldData>,
}

impl World {
    /// Creates an empty world.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock(&self) -> EcsResult<MutexGuard<'_, WorldData>> {
        self.data.lock().map_err(|_| EcsError::PoisonedLock)
    }

    /// Runs `f` with exclusive access to the store.
    ///
    /// This is the escape hatch for reference-shaped access:
    ///
    /// ```
    /// # use columnar_ecs::prelude::*;
    /// # #[derive(Clone, Copy, Default, PartialEq, Debug)]
    /// # struct Position { x: f32, y: f32 }
    /// # let world = World::new();
    /// # let e = world.create().unwrap();
    /// # world.add(e, Position { x: 1.0, y: 2.0 }).unwrap();
    /// world.with(|data| {
    ///     if let Some(position) = data.get_mut::<Position>(e) {
    ///         position.x += 1.0;
    ///     }
    /// }).unwrap();
    /// ```
    pub fn with<R>(&self, f: impl FnOnce(&mut WorldData) -> R) -> EcsResult<R> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    /// Creates a live entity in the empty-signature archetype.
    pub fn create(&self) -> EcsResult<Entity> {
        Ok(self.lock()?.create())
    }

    /// Creates `count` fresh entities under one lock acquisition.
    pub fn create_batch(&self, count: usize) -> EcsResult<Vec<Entity>> {
        Ok(self.lock()?.create_batch(count))
    }

    /// Destroys an entity; stale or dead handles are a no-op.
    pub fn destroy(&self, entity: Entity) -> EcsResult<()> {
        self.lock()?.destroy(entity)
    }

    /// Destroys each entity in order under one lock acquisition.
    pub fn destroy_batch(&self, entities: &[Entity]) -> EcsResult<()> {
        self.lock()?.destroy_batch(entities)
    }

    /// Returns `true` if the handle refers to a live entity.
    pub fn alive(&self, entity: Entity) -> bool {
        match self.lock() {
            Ok(data) => data.alive(entity),
            Err(_) => false,
        }
    }

    /// Adds component `T` to `entity` with `value`; overwrites the value if
    /// `T` is already present.
    pub fn add<T: Component>(&self, entity: Entity, value: T) -> EcsResult<()> {
        self.lock()?.add(entity, value)
    }

    /// Adds every component of set `S` to `entity`, default-constructed.
    pub fn insert<S: ComponentSet>(&self, entity: Entity) -> EcsResult<()> {
        self.lock()?.insert::<S>(entity)
    }

    /// Removes every component of set `S` from `entity`.
    pub fn remove<S: ComponentSet>(&self, entity: Entity) -> EcsResult<()> {
        self.lock()?.remove::<S>(entity)
    }

    /// Returns a copy of `entity`'s `T`, if alive and present.
    pub fn get<T: Component + Clone>(&self, entity: Entity) -> Option<T> {
        match self.lock() {
            Ok(data) => data.get::<T>(entity).cloned(),
            Err(_) => None,
        }
    }

    /// Returns `true` if `entity` is alive and carries `T`.
    pub fn has<T: Component>(&self, entity: Entity) -> bool {
        match self.lock() {
            Ok(data) => data.has::<T>(entity),
            Err(_) => false,
        }
    }

    /// Installs `value` as the singleton of type `R`.
    pub fn set_resource<R: Component>(&self, value: R) -> EcsResult<()> {
        self.lock()?.set_resource(value)
    }

    /// Returns a copy of the installed resource of type `R`.
    pub fn get_resource_cloned<R: Component + Clone>(&self) -> EcsResult<R> {
        Ok(self.lock()?.get_resource::<R>()?.clone())
    }

    /// Runs `f` against the installed resource of type `R`.
    pub fn with_resource<R: Component, Ret>(
        &self,
        f: impl FnOnce(&mut R) -> Ret,
    ) -> EcsResult<Ret> {
        let mut guard = self.lock()?;
        Ok(f(guard.get_resource_mut::<R>()?))
    }

    /// Returns `true` if a resource of type `R` is installed.
    pub fn has_resource<R: Component>(&self) -> bool {
        match self.lock() {
            Ok(data) => data.has_resource::<R>(),
            Err(_) => false,
        }
    }

    /// Subscribes `callback` to fire after `T` is added to any entity.
    pub fn on_component_added<T: Component>(
        &self,
        callback: impl Fn(Entity) + Send + Sync + 'static,
    ) -> EcsResult<()> {
        self.lock()?.on_component_added::<T>(callback)
    }

    /// Subscribes `callback` to fire after `T` is removed from any entity.
    pub fn on_component_removed<T: Component>(
        &self,
        callback: impl Fn(Entity) + Send + Sync + 'static,
    ) -> EcsResult<()> {
        self.lock()?.on_component_removed::<T>(callback)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> EcsResult<usize> {
        Ok(self.lock()?.entity_count())
    }

    /// Number of archetypes created so far.
    pub fn archetype_count(&self) -> EcsResult<usize> {
        Ok(self.lock()?.archetype_count())
    }

    /// Snapshot of the store's memory footprint.
    pub fn memory_usage(&self) -> EcsResult<MemoryUsage> {
        Ok(self.lock()?.memory_usage())
    }

    /// Writes the memory footprint report to standard output.
    pub fn print_memory_usage(&self) -> EcsResult<()> {
        let usage = self.memory_usage()?;
        println!("{usage}");
        Ok(())
    }
}
