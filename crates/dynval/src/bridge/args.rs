//! Call arguments and the typed view native code reads them through

use std::cell::RefMut;

use crate::environment::Environment;
use crate::error::{type_name, BindingError, Result};
use crate::value::{
    DataType, DynArray, DynString, DynValue, ObjectHandle, ResourceHandle, ValueRef,
};

use super::Param;

/// An argument as the caller supplies it.
#[derive(Debug, Clone)]
pub enum CallArg {
    /// A plain value
    Value(DynValue),

    /// The caller's own slot, for by-reference parameters
    Ref(ValueRef),
}

impl CallArg {
    /// Pass the script local `name` by reference.
    ///
    /// Returns `None` if no such local is defined.
    pub fn local(env: &Environment, name: &str) -> Option<Self> {
        env.get_ref(name).map(CallArg::Ref)
    }

    /// Current value of the argument, reading through a reference.
    pub fn value(&self) -> DynValue {
        match self {
            CallArg::Value(v) => v.clone(),
            CallArg::Ref(r) => r.get(),
        }
    }
}

macro_rules! call_arg_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for CallArg {
                fn from(value: $ty) -> Self {
                    CallArg::Value(DynValue::from(value))
                }
            }
        )*
    };
}

call_arg_from!(bool, i64, f64, &str, String, DynString, DynArray, ResourceHandle, ObjectHandle);

impl From<DynValue> for CallArg {
    fn from(value: DynValue) -> Self {
        CallArg::Value(value)
    }
}

impl From<&ValueRef> for CallArg {
    fn from(cell: &ValueRef) -> Self {
        CallArg::Ref(cell.clone())
    }
}

/// A bound argument: already coerced to its declared type.
#[derive(Debug)]
pub(crate) enum Bound {
    Value(DynValue),
    Ref(ValueRef),
}

/// Arguments bound to a signature, as the native body sees them.
///
/// Accessors take a zero-based position and return the declared type's
/// native form. By-value scalars have already been coerced, so `int(0)` on
/// a parameter declared `int` cannot fail with a type error.
#[derive(Debug)]
pub struct NativeArgs {
    function: String,
    params: Vec<Param>,
    bound: Vec<Bound>,
}

impl NativeArgs {
    pub(crate) fn new(function: String, params: Vec<Param>, bound: Vec<Bound>) -> Self {
        Self {
            function,
            params,
            bound,
        }
    }

    /// Name of the function being called.
    pub fn function(&self) -> &str {
        &self.function
    }

    /// Number of bound arguments.
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    /// True if the function takes no arguments.
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }

    fn slot(&self, index: usize) -> std::result::Result<&Bound, BindingError> {
        self.bound
            .get(index)
            .ok_or_else(|| BindingError::MissingArgument {
                function: self.function.clone(),
                position: index + 1,
                count: self.bound.len(),
            })
    }

    fn mismatch(&self, index: usize, expected: DataType, got: &'static str) -> BindingError {
        BindingError::TypeMismatch {
            function: self.function.clone(),
            param: self
                .params
                .get(index)
                .map(|p| p.name.clone())
                .unwrap_or_default(),
            position: index + 1,
            expected,
            got,
        }
    }

    /// The by-value argument at `index`, whatever its type.
    ///
    /// # Errors
    ///
    /// `MissingArgument` for a position past the end, `TypeMismatch` if the
    /// parameter is by-reference (use [`reference`](Self::reference)).
    pub fn mixed(&self, index: usize) -> Result<&DynValue> {
        match self.slot(index)? {
            Bound::Value(v) => Ok(v),
            Bound::Ref(_) => Err(self.mismatch(index, DataType::Mixed, "reference").into()),
        }
    }

    fn typed<'a, T>(
        &'a self,
        index: usize,
        expected: DataType,
        extract: impl FnOnce(&'a DynValue) -> Option<T>,
    ) -> Result<T> {
        let value = self.mixed(index)?;
        extract(value).ok_or_else(|| self.mismatch(index, expected, type_name(value)).into())
    }

    /// Boolean argument.
    pub fn bool(&self, index: usize) -> Result<bool> {
        self.typed(index, DataType::Bool, DynValue::as_bool)
    }

    /// Integer argument.
    pub fn int(&self, index: usize) -> Result<i64> {
        self.typed(index, DataType::Int, DynValue::as_int)
    }

    /// Float argument.
    pub fn float(&self, index: usize) -> Result<f64> {
        self.typed(index, DataType::Float, DynValue::as_double)
    }

    /// String argument.
    pub fn string(&self, index: usize) -> Result<&DynString> {
        self.typed(index, DataType::String, DynValue::as_dyn_string)
    }

    /// Array argument.
    pub fn array(&self, index: usize) -> Result<&DynArray> {
        self.typed(index, DataType::Array, DynValue::as_array)
    }

    /// Resource argument.
    pub fn resource(&self, index: usize) -> Result<&ResourceHandle> {
        self.typed(index, DataType::Resource, DynValue::as_resource)
    }

    /// Object argument.
    pub fn object(&self, index: usize) -> Result<&ObjectHandle> {
        self.typed(index, DataType::Object, DynValue::as_object)
    }

    /// The array behind a by-reference `&mut array` parameter, borrowed
    /// for writing. Binding has already checked that the cell holds an
    /// array.
    ///
    /// # Errors
    ///
    /// `ExpectedReference` if the parameter is by-value, `TypeMismatch` if
    /// the parameter is `&mut mixed` and the cell holds something else.
    pub fn array_mut(&self, index: usize) -> Result<RefMut<'_, DynArray>> {
        let cell = self.reference(index)?;
        RefMut::filter_map(cell.borrow_mut(), DynValue::as_array_mut)
            .map_err(|slot| self.mismatch(index, DataType::Array, type_name(&slot)).into())
    }

    /// The caller's slot behind a by-reference parameter. Writes through it
    /// are visible to the caller once the call returns.
    ///
    /// # Errors
    ///
    /// `ExpectedReference` if the parameter is by-value.
    pub fn reference(&self, index: usize) -> Result<&ValueRef> {
        match self.slot(index)? {
            Bound::Ref(r) => Ok(r),
            Bound::Value(_) => Err(BindingError::ExpectedReference {
                function: self.function.clone(),
                param: self
                    .params
                    .get(index)
                    .map(|p| p.name.clone())
                    .unwrap_or_default(),
                position: index + 1,
            }
            .into()),
        }
    }
}
