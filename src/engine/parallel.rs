//! Parallel iteration adapter over the sequential iteration contract.
//!
//! This module fans the work of a matching-archetype walk out across a
//! rayon thread pool:
//!
//! - `par_for_each_chunk1..3` — one task per matching non-empty archetype,
//!   invoked with whole-column slices;
//! - `par_for_each1..3` — archetypes subdivided into fixed-size row blocks
//!   ([`PAR_BLOCK_ROWS`]), one task per block, invoked per row.
//!
//! ## Concurrency model
//!
//! Work items (column pointer, length pairs) are collected **and executed**
//! while the world lock is held: the adapter enters the world's exclusive
//! session and runs the rayon region inside it. Any facade operation from
//! another thread blocks until the parallel walk completes, so user
//! callbacks can never race a structural mutation.
//!
//! Disjointness between tasks comes from the data layout: distinct
//! archetypes own distinct columns, distinct component types within one
//! archetype own distinct columns, and row blocks of one column never
//! overlap.
//!
//! ## Safety model
//!
//! Raw column views cross thread boundaries inside the work items; their
//! `Send` implementations are justified solely by the disjointness and
//! held-lock arguments above. Callbacks must be `Send + Sync`, must not
//! touch the `World`, and must not panic.

use rayon::prelude::*;

use crate::engine::component::{component_id_of, Component};
use crate::engine::error::EcsResult;
use crate::engine::query::{check_distinct, column_ptr};
use crate::engine::types::Signature;
use crate::engine::world::World;

/// Row-block granularity for `par_for_each` subdivision.
pub const PAR_BLOCK_ROWS: usize = 4096;

macro_rules! impl_parallel {
    (
        $par_for_each:ident, $par_for_each_chunk:ident, $Item:ident,
        $(($T:ident, $id:ident, $ptr:ident, $field:ident)),+
    ) => {
        struct $Item<$($T),+> {
            $($field: *mut $T,)+
            len: usize,
        }

        // Safety: every item references disjoint column ranges (distinct
        // archetypes, distinct component types, non-overlapping row blocks)
        // and the world lock is held for the whole parallel region.
        unsafe impl<$($T: Send),+> Send for $Item<$($T),+> {}

        /// Invokes `f` once per matching non-empty archetype with whole
        /// columns as slices, distributing archetypes across the rayon
        /// pool. The world lock is held until every task finishes.
        pub fn $par_for_each_chunk<$($T: Component),+>(
            world: &World,
            f: impl Fn($(&mut [$T]),+) + Send + Sync,
        ) -> EcsResult<()> {
            world.with(|data| -> EcsResult<()> {
                $(let $id = component_id_of::<$T>()?;)+
                let ids = [$($id),+];
                check_distinct(&ids)?;
                let include = Signature::from_ids(&ids);

                let mut items: Vec<$Item<$($T),+>> = Vec::new();
                for index in 0..data.archetypes().len() {
                    {
                        let archetype = &data.archetypes()[index];
                        if archetype.is_empty()
                            || !archetype.signature().matches(&include, &Signature::empty())
                        {
                            continue;
                        }
                    }
                    let len = data.archetypes()[index].len();
                    $(let $ptr: *mut $T = column_ptr::<$T>(data, index, $id)?;)+
                    items.push($Item { $($field: $ptr,)+ len });
                }

                items.into_par_iter().for_each(|item| {
                    // Safety: disjoint columns per item; lock held across
                    // the region.
                    unsafe {
                        f($(std::slice::from_raw_parts_mut(item.$field, item.len)),+)
                    }
                });
                Ok(())
            })?
        }

        /// Visits every matching row, distributing fixed-size row blocks
        /// across the rayon pool. The world lock is held until every task
        /// finishes.
        pub fn $par_for_each<$($T: Component),+>(
            world: &World,
            f: impl Fn($(&mut $T),+) + Send + Sync,
        ) -> EcsResult<()> {
            world.with(|data| -> EcsResult<()> {
                $(let $id = component_id_of::<$T>()?;)+
                let ids = [$($id),+];
                check_distinct(&ids)?;
                let include = Signature::from_ids(&ids);

                let mut items: Vec<$Item<$($T),+>> = Vec::new();
                for index in 0..data.archetypes().len() {
                    {
                        let archetype = &data.archetypes()[index];
                        if archetype.is_empty()
                            || !archetype.signature().matches(&include, &Signature::empty())
                        {
                            continue;
                        }
                    }
                    let len = data.archetypes()[index].len();
                    $(let $ptr: *mut $T = column_ptr::<$T>(data, index, $id)?;)+

                    let mut start = 0usize;
                    while start < len {
                        let count = PAR_BLOCK_ROWS.min(len - start);
                        // Safety: start < len, so the offset pointer stays
                        // inside the column allocation.
                        items.push($Item {
                            $($field: unsafe { $ptr.add(start) },)+
                            len: count,
                        });
                        start += count;
                    }
                }

                items.into_par_iter().for_each(|item| {
                    for row in 0..item.len {
                        // Safety: row blocks are non-overlapping and the
                        // lock is held across the region.
                        unsafe { f($(&mut *item.$field.add(row)),+) }
                    }
                });
                Ok(())
            })?
        }
    };
}

impl_parallel!(par_for_each1, par_for_each_chunk1, ParItem1, (A, a_id, a_ptr, a));
impl_parallel!(
    par_for_each2, par_for_each_chunk2, ParItem2,
    (A, a_id, a_ptr, a), (B, b_id, b_ptr, b)
);
impl_parallel!(
    par_for_each3, par_for_each_chunk3, ParItem3,
    (A, a_id, a_ptr, a), (B, b_id, b_ptr, b), (C, c_id, c_ptr, c)
);
