//! Display and Debug implementations for DynValue

use std::fmt;

use super::numeric::format_double;
use super::*;

impl fmt::Debug for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DynValue::Null => write!(f, "NULL"),
            DynValue::Bool(b) => write!(f, "bool({})", b),
            DynValue::Int(n) => write!(f, "int({})", n),
            DynValue::Double(d) => write!(f, "float({})", format_double(*d)),
            DynValue::String(s) => write!(f, "string({}) {:?}", s.len(), s),
            DynValue::Array(a) => write!(f, "{:?}", a),
            DynValue::Resource(r) => write!(f, "{:?}", r),
            DynValue::Object(o) => write!(f, "{:?}", o),
        }
    }
}

/// The string coercion of the value.
impl fmt::Display for DynValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dyn_string())
    }
}
