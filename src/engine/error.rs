//! Error types for the entity-component store.
//!
//! This module declares focused, composable error types used across column
//! storage, the type registry, and the world facade. Each error carries
//! enough context to make failures actionable while remaining small and
//! cheap to pass around or convert into the aggregate [`EcsError`].
//!
//! ## Goals
//! * **Specificity:** Each variant models a single failure mode (registry
//!   saturation, missing resource, column addressing faults).
//! * **Ergonomics:** All errors implement [`std::error::Error`] and
//!   [`fmt::Display`], and provide `From<T>` conversions into [`EcsError`].
//! * **Actionability:** Structured fields (offending row, expected vs.
//!   actual type names, capacity) make logs useful without reproducing the
//!   issue.
//!
//! ## Typical flow
//! Low-level column operations return [`ColumnError`]. Higher-level world
//! code uses `?` to bubble failures into [`EcsError`], which callers can
//! match on for control flow or log with user-readable messages.
//!
//! Absence is not an error: reads of dead entities, missing components, and
//! removals of absent components report `None`/`false` and never construct
//! one of these types.

use std::fmt;

use crate::engine::types::ComponentId;

/// Convenience alias for results carrying an [`EcsError`].
pub type EcsResult<T> = Result<T, EcsError>;

/// Errors raised by typed column storage.
///
/// These indicate internal invariant violations rather than recoverable
/// user-facing conditions; a valid operation history never produces one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnError {
    /// A row index addressed storage outside its valid bounds.
    RowOutOfBounds {
        /// Row index that was addressed.
        row: usize,
        /// Number of valid rows in the column.
        len: usize,
    },

    /// The dynamic type of a value or column did not match the column's
    /// declared element type.
    TypeMismatch {
        /// Element type the column declares.
        expected: &'static str,
        /// Type encountered by the caller.
        actual: &'static str,
    },

    /// An archetype was asked for a column its signature does not carry, or
    /// the column was not yet materialized when a read required it.
    MissingColumn {
        /// Component whose column was absent.
        component_id: ComponentId,
    },
}

impl fmt::Display for ColumnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnError::RowOutOfBounds { row, len } => {
                write!(f, "row {} out of bounds (column length {})", row, len)
            }
            ColumnError::TypeMismatch { expected, actual } => {
                write!(f, "column type mismatch: expected {}, got {}", expected, actual)
            }
            ColumnError::MissingColumn { component_id } => {
                write!(f, "no column for component {}", component_id)
            }
        }
    }
}

impl std::error::Error for ColumnError {}

/// Aggregate error for world operations.
///
/// ### Variants
/// * `TooManyComponentTypes` — the registry would exceed the compile-time
///   component ceiling; this is the only error lazy registration can raise.
/// * `ResourceAbsent` — `get_resource` with no installed value of that type.
/// * `Column` — a column-level invariant violation, wrapped for `?`.
/// * `PoisonedLock` — a registry or world lock was poisoned by a panicking
///   thread.
/// * `Internal` — entity or archetype metadata became inconsistent; this
///   indicates a bug in the store, not in the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcsError {
    /// Registering one more component type would exceed the ceiling.
    TooManyComponentTypes {
        /// The compile-time component-type capacity.
        cap: usize,
    },

    /// `get_resource` found no installed value for the requested type.
    ResourceAbsent {
        /// Type name of the missing resource.
        name: &'static str,
    },

    /// A column storage operation failed.
    Column(ColumnError),

    /// The same component type was requested twice by one query, which
    /// would alias a column.
    DuplicateQueryComponent {
        /// Identifier of the repeated component.
        component_id: ComponentId,
    },

    /// A lock was poisoned by a panic on another thread.
    PoisonedLock,

    /// Internal metadata became inconsistent.
    Internal(&'static str),
}

impl fmt::Display for EcsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EcsError::TooManyComponentTypes { cap } => {
                write!(f, "component type limit reached (capacity {})", cap)
            }
            EcsError::ResourceAbsent { name } => {
                write!(f, "resource not installed: {}", name)
            }
            EcsError::Column(e) => write!(f, "{e}"),
            EcsError::DuplicateQueryComponent { component_id } => {
                write!(f, "component {} requested twice in one query", component_id)
            }
            EcsError::PoisonedLock => f.write_str("lock poisoned"),
            EcsError::Internal(what) => write!(f, "internal invariant violated: {}", what),
        }
    }
}

impl std::error::Error for EcsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EcsError::Column(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ColumnError> for EcsError {
    fn from(e: ColumnError) -> Self {
        EcsError::Column(e)
    }
}
