//! Typed iteration over matching archetypes.
//!
//! This module provides the bulk-access surface of the store:
//!
//! - `for_each1` … `for_each4` — per-row references to the requested
//!   components, row-ascending within each matching archetype;
//! - `for_each_chunk1` … `for_each_chunk4` — whole-column slices, invoked
//!   once per matching non-empty archetype, for vectorizable inner loops;
//! - `query1` … `query4` — builders that accumulate an exclude mask via
//!   chained [`exclude`](Query1::exclude) calls before `each`.
//!
//! ## Matching
//! An archetype matches when its signature contains every requested
//! component and none of the excluded ones. Archetypes are visited in
//! creation order, which is deterministic for a fixed operation history but
//! not guaranteed stable across releases.
//!
//! ## Execution model
//! Iteration runs with the world lock held. Callbacks receive `&mut`
//! references (or slices) into column storage and may mutate component
//! values freely; they cannot reach the store itself, so no structural
//! mutation can invalidate the walk. Re-entering the [`World`] facade from
//! a callback deadlocks.
//!
//! ## Safety by discipline
//! The requested component types of one call must be pairwise distinct;
//! this is enforced at runtime and reported as
//! `DuplicateQueryComponent` rather than aliasing a column.

use std::marker::PhantomData;

use crate::engine::component::{component_id_of, Component};
use crate::engine::error::{ColumnError, EcsError, EcsResult};
use crate::engine::storage::downcast_column_mut;
use crate::engine::types::{ComponentId, Signature};
use crate::engine::world::{World, WorldData};

pub(crate) fn check_distinct(ids: &[ComponentId]) -> EcsResult<()> {
    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            if ids[i] == ids[j] {
                return Err(EcsError::DuplicateQueryComponent { component_id: ids[i] });
            }
        }
    }
    Ok(())
}

/// Base pointer of the `T` column of one archetype.
pub(crate) fn column_ptr<T: Component>(
    data: &mut WorldData,
    archetype_index: usize,
    component_id: ComponentId,
) -> EcsResult<*mut T> {
    let archetype = &mut data.archetypes_mut()[archetype_index];
    let column = archetype
        .column_mut(component_id)
        .ok_or(ColumnError::MissingColumn { component_id })?;
    Ok(downcast_column_mut::<T>(column)?.as_mut_slice().as_mut_ptr())
}

macro_rules! impl_iteration {
    (
        $for_each:ident, $for_each_masked:ident,
        $for_each_chunk:ident, $for_each_chunk_masked:ident,
        $query_fn:ident, $Query:ident,
        $(($T:ident, $id:ident, $ptr:ident)),+
    ) => {
        impl WorldData {
            /// Visits every row of every archetype matching the include
            /// mask and not intersecting `exclude`, invoking `f` with
            /// references to the requested components of that row.
            pub fn $for_each_masked<$($T: Component),+>(
                &mut self,
                exclude: &Signature,
                f: &mut impl FnMut($(&mut $T),+),
            ) -> EcsResult<()> {
                $(let $id = component_id_of::<$T>()?;)+
                let ids = [$($id),+];
                check_distinct(&ids)?;
                let include = Signature::from_ids(&ids);

                for index in 0..self.archetypes().len() {
                    {
                        let archetype = &self.archetypes()[index];
                        if archetype.is_empty()
                            || !archetype.signature().matches(&include, exclude)
                        {
                            continue;
                        }
                    }
                    let len = self.archetypes()[index].len();
                    $(let $ptr: *mut $T = column_ptr::<$T>(self, index, $id)?;)+
                    for row in 0..len {
                        // Safety: the ids are pairwise distinct, so the
                        // pointers address disjoint columns, and the callback
                        // has no path back into the store that could move or
                        // free them during the walk.
                        unsafe { f($(&mut *$ptr.add(row)),+) }
                    }
                }
                Ok(())
            }

            /// Visits every row of every archetype whose signature contains
            /// all requested components.
            pub fn $for_each<$($T: Component),+>(
                &mut self,
                mut f: impl FnMut($(&mut $T),+),
            ) -> EcsResult<()> {
                self.$for_each_masked(&Signature::empty(), &mut f)
            }

            /// Invokes `f` once per matching non-empty archetype with the
            /// whole requested columns as slices; all slices share the same
            /// length, the archetype's row count.
            pub fn $for_each_chunk_masked<$($T: Component),+>(
                &mut self,
                exclude: &Signature,
                f: &mut impl FnMut($(&mut [$T]),+),
            ) -> EcsResult<()> {
                $(let $id = component_id_of::<$T>()?;)+
                let ids = [$($id),+];
                check_distinct(&ids)?;
                let include = Signature::from_ids(&ids);

                for index in 0..self.archetypes().len() {
                    {
                        let archetype = &self.archetypes()[index];
                        if archetype.is_empty()
                            || !archetype.signature().matches(&include, exclude)
                        {
                            continue;
                        }
                    }
                    let len = self.archetypes()[index].len();
                    $(let $ptr: *mut $T = column_ptr::<$T>(self, index, $id)?;)+
                    // Safety: as above; each slice covers exactly the rows of
                    // one distinct column.
                    unsafe { f($(std::slice::from_raw_parts_mut($ptr, len)),+) }
                }
                Ok(())
            }

            /// Chunk iteration without an exclude mask.
            pub fn $for_each_chunk<$($T: Component),+>(
                &mut self,
                mut f: impl FnMut($(&mut [$T]),+),
            ) -> EcsResult<()> {
                self.$for_each_chunk_masked(&Signature::empty(), &mut f)
            }
        }

        impl World {
            /// Visits every row of every archetype whose signature contains
            /// all requested components. Holds the world lock for the whole
            /// walk; the callback must not re-enter the world.
            pub fn $for_each<$($T: Component),+>(
                &self,
                mut f: impl FnMut($(&mut $T),+),
            ) -> EcsResult<()> {
                self.with(|data| data.$for_each_masked(&Signature::empty(), &mut f))?
            }

            /// Invokes `f` once per matching non-empty archetype with whole
            /// columns as slices.
            pub fn $for_each_chunk<$($T: Component),+>(
                &self,
                mut f: impl FnMut($(&mut [$T]),+),
            ) -> EcsResult<()> {
                self.with(|data| data.$for_each_chunk_masked(&Signature::empty(), &mut f))?
            }

            /// Starts an exclusion query over the requested components.
            pub fn $query_fn<$($T: Component),+>(&self) -> $Query<'_, $($T),+> {
                $Query { world: self, excludes: Vec::new(), _marker: PhantomData }
            }
        }

        /// Exclusion query accumulated before execution.
        ///
        /// Built by the world's query constructor; `exclude` narrows the
        /// match, `each` runs the walk under the world lock.
        pub struct $Query<'w, $($T: Component),+> {
            world: &'w World,
            excludes: Vec<fn() -> EcsResult<ComponentId>>,
            _marker: PhantomData<fn($($T),+)>,
        }

        impl<'w, $($T: Component),+> $Query<'w, $($T),+> {
            /// Skips archetypes whose signature contains `X`.
            pub fn exclude<X: Component>(mut self) -> Self {
                self.excludes.push(component_id_of::<X>);
                self
            }

            /// Visits every row of every archetype that carries all
            /// requested components and none of the excluded ones.
            pub fn each(self, mut f: impl FnMut($(&mut $T),+)) -> EcsResult<()> {
                let mut exclude = Signature::empty();
                for resolve in &self.excludes {
                    exclude.set(resolve()?);
                }
                self.world.with(|data| data.$for_each_masked(&exclude, &mut f))?
            }
        }
    };
}

impl_iteration!(
    for_each1, for_each1_masked, for_each_chunk1, for_each_chunk1_masked,
    query1, Query1,
    (A, a_id, a_ptr)
);
impl_iteration!(
    for_each2, for_each2_masked, for_each_chunk2, for_each_chunk2_masked,
    query2, Query2,
    (A, a_id, a_ptr), (B, b_id, b_ptr)
);
impl_iteration!(
    for_each3, for_each3_masked, for_each_chunk3, for_each_chunk3_masked,
    query3, Query3,
    (A, a_id, a_ptr), (B, b_id, b_ptr), (C, c_id, c_ptr)
);
impl_iteration!(
    for_each4, for_each4_masked, for_each_chunk4, for_each_chunk4_masked,
    query4, Query4,
    (A, a_id, a_ptr), (B, b_id, b_ptr), (C, c_id, c_ptr), (D, d_id, d_ptr)
);
