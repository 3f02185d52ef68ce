//! Shared mutable cells for by-reference binding

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use super::DynValue;

/// A slot that several holders read and write together.
///
/// Array entries installed with [`DynArray::set_ref`](super::DynArray::set_ref),
/// script locals, and by-reference native parameters are all `ValueRef`s.
/// Cloning a `ValueRef` creates another alias, not a copy; a write through
/// any alias is seen by all of them.
#[derive(Clone)]
pub struct ValueRef {
    cell: Rc<RefCell<DynValue>>,
}

impl ValueRef {
    /// Box `value` in a fresh cell.
    pub fn new(value: impl Into<DynValue>) -> Self {
        Self {
            cell: Rc::new(RefCell::new(value.into())),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> DynValue {
        self.cell.borrow().clone()
    }

    /// Overwrite the value seen by every alias.
    pub fn set(&self, value: impl Into<DynValue>) {
        *self.cell.borrow_mut() = value.into();
    }

    /// Overwrite and return the previous value.
    pub fn replace(&self, value: impl Into<DynValue>) -> DynValue {
        self.cell.replace(value.into())
    }

    /// Borrow the value in place.
    ///
    /// # Panics
    ///
    /// Panics if the cell is currently mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, DynValue> {
        self.cell.borrow()
    }

    /// Mutably borrow the value in place.
    ///
    /// # Panics
    ///
    /// Panics if the cell is currently borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, DynValue> {
        self.cell.borrow_mut()
    }

    /// Whether both handles are aliases of one cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }

    /// Number of aliases to this cell.
    pub fn alias_count(&self) -> usize {
        Rc::strong_count(&self.cell)
    }
}

impl Default for ValueRef {
    fn default() -> Self {
        Self::new(DynValue::Null)
    }
}

impl fmt::Debug for ValueRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell.try_borrow() {
            Ok(value) => write!(f, "&{:?}", *value),
            Err(_) => write!(f, "&<borrowed>"),
        }
    }
}
