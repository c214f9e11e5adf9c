//! Per-component lifecycle callback lists.
//!
//! The event bus keeps, for each component type, two ordered lists of
//! type-erased callbacks: one fired after a component is added to an
//! entity, one after it is removed. The migration engine invokes them once
//! the structural transition has committed.
//!
//! Callbacks receive only the entity handle. They run while the world lock
//! is held, so they must not re-enter the world facade and must not panic.

use std::collections::HashMap;

use crate::engine::entity::Entity;
use crate::engine::types::ComponentId;

/// Type-erased lifecycle callback.
pub type EventCallback = Box<dyn Fn(Entity) + Send + Sync>;

#[derive(Default)]
struct Handlers {
    on_add: Vec<EventCallback>,
    on_remove: Vec<EventCallback>,
}

/// Ordered on-add / on-remove subscriber lists keyed by component id.
#[derive(Default)]
pub struct EventBus {
    handlers: HashMap<ComponentId, Handlers>,
}

impl EventBus {
    /// Appends `callback` to the on-add list for `component_id`.
    pub fn subscribe_added(&mut self, component_id: ComponentId, callback: EventCallback) {
        self.handlers.entry(component_id).or_default().on_add.push(callback);
    }

    /// Appends `callback` to the on-remove list for `component_id`.
    pub fn subscribe_removed(&mut self, component_id: ComponentId, callback: EventCallback) {
        self.handlers.entry(component_id).or_default().on_remove.push(callback);
    }

    /// Invokes the on-add list for `component_id` in registration order.
    pub fn fire_added(&self, component_id: ComponentId, entity: Entity) {
        if let Some(handlers) = self.handlers.get(&component_id) {
            for callback in &handlers.on_add {
                callback(entity);
            }
        }
    }

    /// Invokes the on-remove list for `component_id` in registration order.
    pub fn fire_removed(&self, component_id: ComponentId, entity: Entity) {
        if let Some(handlers) = self.handlers.get(&component_id) {
            for callback in &handlers.on_remove {
                callback(entity);
            }
        }
    }
}
