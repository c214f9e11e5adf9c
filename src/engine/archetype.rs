//! # Archetype storage
//!
//! An [`Archetype`] owns the row-parallel storage for every entity that
//! carries one exact set of component types: one typed column per component
//! in the signature, plus a column of entity handles.
//!
//! ## Design
//! - Component data is stored column-major, one contiguous column per type.
//! - Rows are densely packed; removal is swap-with-last.
//! - Columns are materialized lazily, on the first migration into the
//!   archetype, so archetypes touched only through query masks never
//!   allocate storage.
//!
//! ## Invariants
//! - For every materialized column, `column.len() == entities.len()`.
//! - `columns[id]` is materialized only if `signature` contains `id`.
//! - For every row `r` and component `id` in the signature,
//!   `columns[id][r]` belongs to `entities[r]`.
//!
//! Callers (the world's migration engine) are responsible for keeping the
//! entity location table consistent with the neighbor relocations reported
//! by the swap-remove operations here.

use crate::engine::component::column_factory;
use crate::engine::entity::Entity;
use crate::engine::error::{ColumnError, EcsResult};
use crate::engine::storage::TypeErasedColumn;
use crate::engine::types::{ArchetypeId, ComponentId, Signature, MAX_COMPONENTS};

/// Row container for one specific component-set signature.
pub struct Archetype {
    id: ArchetypeId,
    signature: Signature,
    entities: Vec<Entity>,
    columns: Vec<Option<Box<dyn TypeErasedColumn>>>,
}

impl Archetype {
    /// Creates an empty archetype for `signature`.
    ///
    /// All column slots start empty; a column is materialized the first
    /// time an entity migrates in.
    pub(crate) fn new(id: ArchetypeId, signature: Signature) -> Self {
        Self {
            id,
            signature,
            entities: Vec::new(),
            columns: (0..MAX_COMPONENTS).map(|_| None).collect(),
        }
    }

    /// Identifier of this archetype, stable for the life of the world.
    #[inline]
    pub fn id(&self) -> ArchetypeId {
        self.id
    }

    /// The component-set signature keying this archetype.
    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Number of entities stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entities are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns `true` if the signature contains `component_id`.
    #[inline]
    pub fn has(&self, component_id: ComponentId) -> bool {
        self.signature.has(component_id)
    }

    /// The entity handles stored in this archetype, row order.
    #[inline]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// The entity at `row`, if in bounds.
    #[inline]
    pub fn entity_at(&self, row: usize) -> Option<Entity> {
        self.entities.get(row).copied()
    }

    /// The materialized column for `component_id`, if any.
    #[inline]
    pub fn column(&self, component_id: ComponentId) -> Option<&dyn TypeErasedColumn> {
        self.columns
            .get(component_id as usize)
            .and_then(|c| c.as_deref())
    }

    /// The materialized column for `component_id`, mutably.
    #[inline]
    pub(crate) fn column_mut(
        &mut self,
        component_id: ComponentId,
    ) -> Option<&mut (dyn TypeErasedColumn + 'static)> {
        self.columns
            .get_mut(component_id as usize)
            .and_then(|c| c.as_deref_mut())
    }

    /// Materializes the column for `component_id` if not already present.
    ///
    /// Must only be called for components in the signature; the column is
    /// allocated through the registry's factory.
    pub(crate) fn ensure_column(&mut self, component_id: ComponentId) -> EcsResult<()> {
        debug_assert!(self.signature.has(component_id));
        let slot = &mut self.columns[component_id as usize];
        if slot.is_none() {
            let factory = column_factory(component_id)?;
            *slot = Some(factory());
            tracing::trace!(
                archetype = self.id,
                component_id,
                "materialized column"
            );
        }
        Ok(())
    }

    /// Appends an entity handle, reserving the next row.
    ///
    /// Column pushes for that row are performed separately by the migration
    /// engine; this only extends the entity column.
    pub(crate) fn push_entity(&mut self, entity: Entity) -> usize {
        let row = self.entities.len();
        self.entities.push(entity);
        row
    }

    /// Swap-removes `row` from the entity column only.
    ///
    /// Returns the entity that was relocated into `row`, if the removed row
    /// was not the last one. The caller rewrites that entity's location.
    pub(crate) fn swap_remove_entity(&mut self, row: usize) -> Option<Entity> {
        self.entities.swap_remove(row);
        self.entities.get(row).copied()
    }

    /// Swap-removes `row` from every materialized column and the entity
    /// column, dropping the removed component values.
    ///
    /// Returns the relocated neighbor as for [`Self::swap_remove_entity`].
    pub(crate) fn swap_remove_row(&mut self, row: usize) -> EcsResult<Option<Entity>> {
        if row >= self.entities.len() {
            return Err(ColumnError::RowOutOfBounds { row, len: self.entities.len() }.into());
        }
        for component_id in self.signature.iter() {
            match self.columns[component_id as usize].as_deref_mut() {
                Some(column) => column.swap_remove(row)?,
                None => return Err(ColumnError::MissingColumn { component_id }.into()),
            }
        }
        Ok(self.swap_remove_entity(row))
    }

    /// Transfers the component data of `src_row` into `destination`.
    ///
    /// ## Behavior
    /// For each component in the destination signature:
    /// - present in both: the value is moved out of this archetype's column
    ///   (which compacts itself by swap-remove) and appended to the
    ///   destination column;
    /// - present only in the destination: a default-constructed value is
    ///   appended.
    ///
    /// Components present only in this archetype are then swap-removed with
    /// drop. Afterwards every column of both archetypes is compacted at the
    /// same row; the entity columns are handled by the caller.
    ///
    /// ## Errors
    /// `MissingColumn` if a required destination column was not materialized
    /// before the call, or a source column is absent.
    pub(crate) fn move_row_to(
        &mut self,
        destination: &mut Archetype,
        src_row: usize,
    ) -> EcsResult<()> {
        if src_row >= self.entities.len() {
            return Err(ColumnError::RowOutOfBounds { row: src_row, len: self.entities.len() }.into());
        }

        for component_id in destination.signature.iter() {
            let dst_column = destination.columns[component_id as usize]
                .as_deref_mut()
                .ok_or(ColumnError::MissingColumn { component_id })?;

            if self.signature.has(component_id) {
                let src_column = self.columns[component_id as usize]
                    .as_deref_mut()
                    .ok_or(ColumnError::MissingColumn { component_id })?;
                dst_column.push_move_from(src_column, src_row)?;
            } else {
                dst_column.push_default();
            }
        }

        for component_id in self.signature.iter() {
            if destination.signature.has(component_id) {
                continue;
            }
            let src_column = self.columns[component_id as usize]
                .as_deref_mut()
                .ok_or(ColumnError::MissingColumn { component_id })?;
            src_column.swap_remove(src_row)?;
        }

        Ok(())
    }

    /// Total bytes of component data held by materialized columns.
    pub fn component_bytes(&self) -> usize {
        self.columns
            .iter()
            .filter_map(|c| c.as_deref())
            .map(|c| c.element_size() * c.len())
            .sum()
    }
}

impl std::fmt::Debug for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archetype")
            .field("id", &self.id)
            .field("signature", &self.signature)
            .field("entities", &self.entities.len())
            .finish()
    }
}
