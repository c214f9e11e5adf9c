use std::any::{type_name, Any, TypeId};

use crate::engine::error::ColumnError;

/// Type-erased interface over one component column.
///
/// Invariant: a column's length always equals the entity count of the
/// archetype that owns it, for every materialized column.
pub trait TypeErasedColumn: Any + Send + Sync {
    /// Number of rows currently stored.
    fn len(&self) -> usize;

    /// Returns `true` if the column holds no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upcast for typed downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed downcasting.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// `TypeId` of the element type.
    fn element_type_id(&self) -> TypeId;

    /// Type name of the element type, for diagnostics.
    fn element_type_name(&self) -> &'static str;

    /// Size in bytes of one element.
    fn element_size(&self) -> usize;

    /// Appends a default-constructed element.
    fn push_default(&mut self);

    /// Overwrites `row` with the last element (move) and shortens the
    /// column, dropping the removed value.
    fn swap_remove(&mut self, row: usize) -> Result<(), ColumnError>;

    /// Moves `source[source_row]` onto the end of `self`, back-filling the
    /// vacated source slot with the source's last element and shortening the
    /// source.
    ///
    /// Both columns must store the same element type.
    fn push_move_from(
        &mut self,
        source: &mut dyn TypeErasedColumn,
        source_row: usize,
    ) -> Result<(), ColumnError>;
}

/// Contiguous storage for all values of one component type within one
/// archetype. Rows are parallel to the owning archetype's entity column.
pub struct Column<T> {
    values: Vec<T>,
}

impl<T> Default for Column<T> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<T> Column<T> {
    /// Appends a value.
    #[inline]
    pub fn push(&mut self, value: T) {
        self.values.push(value);
    }

    /// Returns the value at `row`, if in bounds.
    #[inline]
    pub fn get(&self, row: usize) -> Option<&T> {
        self.values.get(row)
    }

    /// Returns the value at `row` mutably, if in bounds.
    #[inline]
    pub fn get_mut(&mut self, row: usize) -> Option<&mut T> {
        self.values.get_mut(row)
    }

    /// Writes `value` into `row`, dropping the previous value.
    #[inline]
    pub fn set(&mut self, row: usize, value: T) -> Result<(), ColumnError> {
        match self.values.get_mut(row) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(ColumnError::RowOutOfBounds { row, len: self.values.len() }),
        }
    }

    /// All rows as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    /// All rows as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.values
    }
}

impl<T: Default + Send + Sync + 'static> TypeErasedColumn for Column<T> {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn element_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn element_type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn element_size(&self) -> usize {
        std::mem::size_of::<T>()
    }

    fn push_default(&mut self) {
        self.values.push(T::default());
    }

    fn swap_remove(&mut self, row: usize) -> Result<(), ColumnError> {
        if row >= self.values.len() {
            return Err(ColumnError::RowOutOfBounds { row, len: self.values.len() });
        }
        self.values.swap_remove(row);
        Ok(())
    }

    fn push_move_from(
        &mut self,
        source: &mut dyn TypeErasedColumn,
        source_row: usize,
    ) -> Result<(), ColumnError> {
        let source_name = source.element_type_name();
        let source = source
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .ok_or(ColumnError::TypeMismatch {
                expected: type_name::<T>(),
                actual: source_name,
            })?;

        if source_row >= source.values.len() {
            return Err(ColumnError::RowOutOfBounds {
                row: source_row,
                len: source.values.len(),
            });
        }

        // swap_remove both extracts the value and compacts the source.
        let value = source.values.swap_remove(source_row);
        self.values.push(value);
        Ok(())
    }
}

/// Downcasts a type-erased column to its concrete storage.
#[inline]
pub fn downcast_column<T: 'static>(
    column: &dyn TypeErasedColumn,
) -> Result<&Column<T>, ColumnError> {
    let actual = column.element_type_name();
    column
        .as_any()
        .downcast_ref::<Column<T>>()
        .ok_or(ColumnError::TypeMismatch { expected: type_name::<T>(), actual })
}

/// Downcasts a type-erased column to its concrete storage, mutably.
#[inline]
pub fn downcast_column_mut<T: 'static>(
    column: &mut dyn TypeErasedColumn,
) -> Result<&mut Column<T>, ColumnError> {
    let actual = column.element_type_name();
    column
        .as_any_mut()
        .downcast_mut::<Column<T>>()
        .ok_or(ColumnError::TypeMismatch { expected: type_name::<T>(), actual })
}
