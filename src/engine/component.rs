//! # Component Registry
//!
//! This module provides a global registry that assigns stable
//! [`ComponentId`] values to Rust component types and exposes type-erased
//! column factories for archetype storage allocation.
//!
//! ## Purpose
//! The registry decouples component type information (`TypeId`, name, size,
//! alignment) from runtime storage, enabling archetypes to store
//! heterogeneous component columns behind `TypeErasedColumn`.
//!
//! ## Design
//! - Components are registered **lazily on first use**: the first mention of
//!   a type `T` assigns the next free `ComponentId` in
//!   `[0, MAX_COMPONENTS)` and installs a `Column<T>` factory.
//! - Identifiers are stable for the life of the process; there is no
//!   unregistration.
//! - Registration fails with `TooManyComponentTypes` once the ceiling is
//!   reached.
//!
//! ## Invariants
//! - `ComponentId` values are unique and stable for the lifetime of the
//!   process.
//! - A registered component always has a corresponding column factory.
//!
//! ## Concurrency
//! The registry is protected by `RwLock` behind a `OnceLock`, so concurrent
//! first use of the same type is race-free: reads take the shared path, and
//! the write path re-checks before assigning an identifier.

use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    mem::{align_of, size_of},
    sync::{OnceLock, RwLock},
};

use crate::engine::error::{EcsError, EcsResult};
use crate::engine::storage::{Column, TypeErasedColumn};
use crate::engine::types::{ComponentId, MAX_COMPONENTS};

/// Marker trait for component types.
///
/// Any plain-data type that is `Default + Send + Sync + 'static` qualifies;
/// `Default` supplies the column's default constructor and `Send + Sync`
/// let columns cross the parallel iteration adapter. Zero-sized tag types
/// are valid components.
pub trait Component: Default + Send + Sync + 'static {}

impl<T: Default + Send + Sync + 'static> Component for T {}

/// Factory function constructing an empty type-erased column.
pub type ColumnFactory = fn() -> Box<dyn TypeErasedColumn>;

fn new_column<T: Component>() -> Box<dyn TypeErasedColumn> {
    Box::new(Column::<T>::default())
}

/// Describes a registered component type.
///
/// ## Fields
/// - `component_id`: The runtime identifier assigned by the registry.
/// - `name`: The Rust type name (`type_name::<T>()`).
/// - `type_id`: The runtime `TypeId` for the component.
/// - `size`: `size_of::<T>()` in bytes.
/// - `align`: `align_of::<T>()` in bytes.
///
/// ## Notes
/// `ComponentDesc` is `Copy` and safe to clone freely for reporting and
/// diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentDesc {
    /// Runtime identifier assigned to this component type.
    pub component_id: ComponentId,

    /// Rust type name for diagnostics.
    pub name: &'static str,

    /// Runtime `TypeId` of the component.
    pub type_id: TypeId,

    /// Size of the component type in bytes.
    pub size: usize,

    /// Alignment of the component type in bytes.
    pub align: usize,
}

impl std::fmt::Display for ComponentDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ComponentDesc {{ id: {}, name: {}, size: {}, align: {} }}",
            self.component_id, self.name, self.size, self.align
        )
    }
}

struct ComponentRegistry {
    next_id: ComponentId,
    by_type: HashMap<TypeId, ComponentId>,
    by_id: Vec<Option<ComponentDesc>>,
    factories: Vec<Option<ColumnFactory>>,
}

static REGISTRY: OnceLock<RwLock<ComponentRegistry>> = OnceLock::new();

fn component_registry() -> &'static RwLock<ComponentRegistry> {
    REGISTRY.get_or_init(|| {
        RwLock::new(ComponentRegistry {
            next_id: 0,
            by_type: HashMap::new(),
            by_id: vec![None; MAX_COMPONENTS],
            factories: vec![None; MAX_COMPONENTS],
        })
    })
}

impl ComponentRegistry {
    fn register<T: Component>(&mut self) -> EcsResult<ComponentId> {
        let type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&type_id) {
            return Ok(existing);
        }

        let id = self.next_id;
        if (id as usize) >= MAX_COMPONENTS {
            return Err(EcsError::TooManyComponentTypes { cap: MAX_COMPONENTS });
        }
        self.next_id = id + 1;

        self.by_type.insert(type_id, id);
        self.by_id[id as usize] = Some(ComponentDesc {
            component_id: id,
            name: type_name::<T>(),
            type_id,
            size: size_of::<T>(),
            align: align_of::<T>(),
        });
        self.factories[id as usize] = Some(new_column::<T>);

        tracing::debug!(
            component_id = id,
            component = type_name::<T>(),
            size = size_of::<T>(),
            "registered component type"
        );

        Ok(id)
    }
}

/// Returns the [`ComponentId`] for `T`, registering the type on first use.
///
/// ## Behavior
/// - The shared read path resolves already-registered types without
///   contention.
/// - On first mention, the write path assigns the next free identifier and
///   installs the `Column<T>` factory.
///
/// ## Errors
/// - `TooManyComponentTypes` when the registry would exceed
///   [`MAX_COMPONENTS`].
/// - `PoisonedLock` if the registry lock was poisoned.
pub fn component_id_of<T: Component>() -> EcsResult<ComponentId> {
    let registry = component_registry();

    {
        let registry = registry.read().map_err(|_| EcsError::PoisonedLock)?;
        if let Some(&id) = registry.by_type.get(&TypeId::of::<T>()) {
            return Ok(id);
        }
    }

    let mut registry = registry.write().map_err(|_| EcsError::PoisonedLock)?;
    registry.register::<T>()
}

/// Returns a copy of the descriptor for `component_id`, if registered.
pub fn component_desc(component_id: ComponentId) -> EcsResult<Option<ComponentDesc>> {
    let registry = component_registry().read().map_err(|_| EcsError::PoisonedLock)?;
    Ok(registry.by_id.get(component_id as usize).and_then(|d| *d))
}

/// Returns the column factory for `component_id`.
///
/// ## Errors
/// `Internal` if the identifier was never assigned; archetype signatures
/// only ever carry registered identifiers, so this indicates a store bug.
pub fn column_factory(component_id: ComponentId) -> EcsResult<ColumnFactory> {
    let registry = component_registry().read().map_err(|_| EcsError::PoisonedLock)?;
    registry
        .factories
        .get(component_id as usize)
        .and_then(|f| *f)
        .ok_or(EcsError::Internal("no column factory for component id"))
}

/// A statically-typed set of component types, used by bulk add/remove
/// operations.
///
/// Implemented for tuples of [`Component`] types up to arity four:
/// `(A,)`, `(A, B)`, `(A, B, C)`, `(A, B, C, D)`.
pub trait ComponentSet: 'static {
    /// Resolves the component identifiers of this set, registering any type
    /// on first use. Identifiers are returned in tuple order.
    fn component_ids() -> EcsResult<Vec<ComponentId>>;
}

macro_rules! impl_component_set {
    ($($ty:ident),+) => {
        impl<$($ty: Component),+> ComponentSet for ($($ty,)+) {
            fn component_ids() -> EcsResult<Vec<ComponentId>> {
                Ok(vec![$(component_id_of::<$ty>()?),+])
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
