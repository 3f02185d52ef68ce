//! Dynamic values shared between native code and scripts

mod array;
mod buffer;
mod convert;
mod display;
mod handles;
mod key;
pub(crate) mod numeric;
mod refs;
mod string;

pub use array::DynArray;
pub use buffer::SharedBuffer;
pub use handles::{ObjectHandle, ResourceHandle};
pub use key::ArrayKey;
pub use refs::ValueRef;
pub use string::DynString;

use std::fmt;

/// A dynamically typed value: exactly one of eight variants.
///
/// Scalars are stored inline. Strings and arrays share storage and copy it
/// on write, so cloning a `DynValue` is always cheap. Resources and objects
/// are handles; clones refer to the same underlying thing.
///
/// Conversions between variants live in the `to_*` methods and follow one
/// fixed coercion table; they never modify `self`.
#[derive(Clone, Default)]
pub enum DynValue {
    /// The null value
    #[default]
    Null,

    /// `true` or `false`
    Bool(bool),

    /// 64-bit signed integer
    Int(i64),

    /// Double-precision float
    Double(f64),

    /// Byte string
    String(DynString),

    /// Ordered hybrid array
    Array(DynArray),

    /// Opaque native resource
    Resource(ResourceHandle),

    /// Script object
    Object(ObjectHandle),
}

/// Declared type of a native parameter or return value, and the runtime
/// type tag of a [`DynValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// No value (return type only)
    Void,
    /// `bool`
    Bool,
    /// `int`
    Int,
    /// `float`
    Float,
    /// `string`
    String,
    /// `array`
    Array,
    /// `resource`
    Resource,
    /// `object`
    Object,
    /// `mixed`: any value, passed through unchanged
    Mixed,
}

impl DataType {
    /// Script-facing name of the type.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Void => "null",
            DataType::Bool => "bool",
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::String => "string",
            DataType::Array => "array",
            DataType::Resource => "resource",
            DataType::Object => "object",
            DataType::Mixed => "mixed",
        }
    }

    /// Types that accept any scalar and coerce it.
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            DataType::Bool | DataType::Int | DataType::Float | DataType::String
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Void => f.write_str("void"),
            other => f.write_str(other.name()),
        }
    }
}
