//! Type-keyed singleton value store.
//!
//! Resources are world-global values keyed by the component identifier of
//! their type (resource types draw from the same dense id space as
//! components). At most one value per type exists; installing a new value
//! drops the previous one, and all values are dropped with the world.

use std::any::{type_name, Any};
use std::collections::HashMap;

use crate::engine::error::{EcsError, EcsResult};
use crate::engine::types::ComponentId;

/// Heterogeneous singleton store.
///
/// Values are boxed `Any`; the box's own drop glue replaces any manual
/// destructor bookkeeping.
#[derive(Default)]
pub struct ResourceStore {
    values: HashMap<ComponentId, Box<dyn Any + Send + Sync>>,
}

impl ResourceStore {
    /// Installs `value` under `key`, dropping any previous value.
    pub fn set<R: Send + Sync + 'static>(&mut self, key: ComponentId, value: R) {
        self.values.insert(key, Box::new(value));
    }

    /// Returns the installed value for `key`.
    ///
    /// ## Errors
    /// `ResourceAbsent` when nothing is installed under `key`.
    pub fn get<R: Send + Sync + 'static>(&self, key: ComponentId) -> EcsResult<&R> {
        self.values
            .get(&key)
            .and_then(|boxed| boxed.downcast_ref::<R>())
            .ok_or(EcsError::ResourceAbsent { name: type_name::<R>() })
    }

    /// Returns the installed value for `key`, mutably.
    ///
    /// ## Errors
    /// `ResourceAbsent` when nothing is installed under `key`.
    pub fn get_mut<R: Send + Sync + 'static>(&mut self, key: ComponentId) -> EcsResult<&mut R> {
        self.values
            .get_mut(&key)
            .and_then(|boxed| boxed.downcast_mut::<R>())
            .ok_or(EcsError::ResourceAbsent { name: type_name::<R>() })
    }

    /// Returns `true` if a value is installed under `key`.
    pub fn has(&self, key: ComponentId) -> bool {
        self.values.contains_key(&key)
    }
}
