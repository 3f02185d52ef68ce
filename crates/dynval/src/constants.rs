//! Process-wide constants and interned names
//!
//! Everything here is `Send + Sync` and lives for the rest of the process:
//! names are interned once and constants are write-once. Any execution
//! context on any thread sees the same table.

use std::sync::OnceLock;

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use tracing::{debug, trace};

use crate::error::ConstantError;
use crate::value::{DynString, DynValue};

static INTERNED: OnceLock<DashSet<&'static str>> = OnceLock::new();
static CONSTANTS: OnceLock<DashMap<&'static str, Constant>> = OnceLock::new();

fn interned() -> &'static DashSet<&'static str> {
    INTERNED.get_or_init(DashSet::new)
}

fn constants() -> &'static DashMap<&'static str, Constant> {
    CONSTANTS.get_or_init(DashMap::new)
}

/// Return the process-wide copy of `s`, leaking it on first sight.
///
/// Interned strings are never freed, so only intern a bounded set of
/// names (function, constant and class names), never script data.
pub fn intern(s: &str) -> &'static str {
    if let Some(existing) = interned().get(s) {
        return *existing;
    }
    let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
    trace!(interned = leaked, "interning string");
    interned().insert(leaked);
    leaked
}

/// A registered constant's value. Only scalars and static strings can be
/// shared across contexts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant {
    /// `null`
    Null,
    /// Boolean constant
    Bool(bool),
    /// Integer constant
    Int(i64),
    /// Double constant
    Double(f64),
    /// Static string constant
    Str(&'static str),
}

impl Constant {
    /// String constant from any text; the text is interned.
    pub fn str(s: &str) -> Self {
        Constant::Str(intern(s))
    }

    /// Identity comparison: like `==`, but doubles compare by bit pattern,
    /// so a NaN constant matches itself.
    pub fn is_identical(&self, other: &Constant) -> bool {
        match (self, other) {
            (Constant::Double(a), Constant::Double(b)) => a.to_bits() == b.to_bits(),
            _ => self == other,
        }
    }

    /// The constant as a value. String constants are backed by static
    /// storage and never copied until written.
    pub fn to_value(self) -> DynValue {
        match self {
            Constant::Null => DynValue::Null,
            Constant::Bool(b) => DynValue::Bool(b),
            Constant::Int(n) => DynValue::Int(n),
            Constant::Double(d) => DynValue::Double(d),
            Constant::Str(s) => DynValue::String(DynString::from_static(s)),
        }
    }
}

/// Register `name` as a constant.
///
/// # Errors
///
/// Returns `AlreadyDefined` if `name` is already registered. The first
/// value stays in place.
pub fn register_constant(name: &str, value: Constant) -> Result<(), ConstantError> {
    let name = intern(name);
    match constants().entry(name) {
        Entry::Occupied(_) => Err(ConstantError::AlreadyDefined(name.to_string())),
        Entry::Vacant(slot) => {
            slot.insert(value);
            debug!(constant = name, ?value, "registered constant");
            Ok(())
        }
    }
}

/// Look up a registered constant.
pub fn constant(name: &str) -> Option<Constant> {
    constants().get(name).map(|entry| *entry.value())
}

/// Whether `name` is registered.
pub fn is_defined(name: &str) -> bool {
    constants().contains_key(name)
}
