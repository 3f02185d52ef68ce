//! Script locals visible to native calls

use indexmap::IndexMap;

use crate::error::EnvironmentError;
use crate::value::{DynValue, ValueRef};

/// Script locals, by name, in definition order.
///
/// Each local lives in a [`ValueRef`] cell, which is what lets a native
/// function write to a by-reference argument and have the caller see it.
///
/// # Example
///
/// ```
/// use dynval::{DynValue, Environment};
///
/// let mut env = Environment::new();
/// env.define("x", 1i64);
///
/// let alias = env.get_ref("x").unwrap();
/// alias.set(10i64);
/// assert_eq!(env.get("x"), Some(DynValue::Int(10)));
///
/// // Redefining detaches the old cell.
/// env.define("x", 2i64);
/// assert_eq!(alias.get(), DynValue::Int(10));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Environment {
    locals: IndexMap<String, ValueRef>,
}

impl Environment {
    /// Create a new empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Binding Definition
    // ═══════════════════════════════════════════════════════════════════

    /// Define a local in a fresh cell. A local of the same name keeps its
    /// position but loses its old cell, so earlier aliases stop seeing it.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<DynValue>) {
        self.locals.insert(name.into(), ValueRef::new(value));
    }

    /// Define a local that aliases an existing cell.
    pub fn define_ref(&mut self, name: impl Into<String>, cell: &ValueRef) {
        self.locals.insert(name.into(), cell.clone());
    }

    /// Drop a local, returning its cell. Other aliases of the cell keep it
    /// alive.
    pub fn remove(&mut self, name: &str) -> Option<ValueRef> {
        self.locals.shift_remove(name)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Binding Lookup
    // ═══════════════════════════════════════════════════════════════════

    /// Current value of the local called `name`.
    pub fn get(&self, name: &str) -> Option<DynValue> {
        self.locals.get(name).map(ValueRef::get)
    }

    /// The cell behind the local called `name`, for passing it by
    /// reference.
    pub fn get_ref(&self, name: &str) -> Option<ValueRef> {
        self.locals.get(name).cloned()
    }

    /// Check if a local exists.
    pub fn contains(&self, name: &str) -> bool {
        self.locals.contains_key(name)
    }

    /// Write to an existing local. Every alias of its cell sees the write.
    ///
    /// # Errors
    ///
    /// Returns `UndefinedVariable` if no such local exists.
    pub fn assign(&self, name: &str, value: impl Into<DynValue>) -> Result<(), EnvironmentError> {
        match self.locals.get(name) {
            Some(cell) => {
                cell.set(value);
                Ok(())
            }
            None => Err(EnvironmentError::UndefinedVariable {
                name: name.to_string(),
            }),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Iteration and Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// Iterate over locals in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValueRef)> {
        self.locals.iter().map(|(name, cell)| (name.as_str(), cell))
    }

    /// Number of locals.
    pub fn len(&self) -> usize {
        self.locals.len()
    }

    /// Check if the environment is empty.
    pub fn is_empty(&self) -> bool {
        self.locals.is_empty()
    }

    /// Drop every local.
    pub fn clear(&mut self) {
        self.locals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_goes_through_shared_cell() {
        let mut env = Environment::new();
        env.define("a", 1i64);
        let cell = env.get_ref("a").unwrap();
        env.define_ref("b", &cell);

        env.assign("b", 2i64).unwrap();
        assert_eq!(env.get("a"), Some(DynValue::Int(2)));
        assert_eq!(cell.alias_count(), 3);
    }

    #[test]
    fn test_redefine_keeps_position() {
        let mut env = Environment::new();
        env.define("first", 1i64);
        env.define("second", 2i64);
        env.define("first", 3i64);

        let names: Vec<&str> = env.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(env.get("first"), Some(DynValue::Int(3)));
    }

    #[test]
    fn test_remove_leaves_aliases_alive() {
        let mut env = Environment::new();
        env.define("x", "kept");
        let alias = env.get_ref("x").unwrap();

        assert!(env.remove("x").is_some());
        assert!(!env.contains("x"));
        assert_eq!(alias.get(), DynValue::from("kept"));
        assert!(env.remove("x").is_none());
    }
}
