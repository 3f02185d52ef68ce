//! Extensions: named bundles of native functions and constants

mod standard;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::bridge::{NativeArgs, NativeFunction};
use crate::constants::{constant, register_constant, Constant};
use crate::error::{BridgeError, ConstantError, Result};
use crate::value::DynValue;

/// A named set of native functions and the constants they publish.
///
/// Build one up with [`function`](Self::function) and
/// [`constant`](Self::constant), then hand it to
/// [`ExecutionContext::load`](crate::ExecutionContext::load).
///
/// ```
/// use dynval::{DynValue, Extension};
///
/// let mut ext = Extension::new("math");
/// ext.function("fn double(n: int) -> int", |args| {
///     Ok(DynValue::Int(args.int(0)? * 2))
/// })?;
/// assert_eq!(ext.get("double").unwrap().call(vec![21i64.into()])?, DynValue::Int(42));
/// # Ok::<(), dynval::BridgeError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Extension {
    name: String,
    functions: IndexMap<String, NativeFunction>,
    constants: Vec<(String, Constant)>,
}

impl Extension {
    /// Create an empty extension.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: IndexMap::new(),
            constants: Vec::new(),
        }
    }

    /// Extension name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare a function from its signature text and body.
    ///
    /// # Errors
    ///
    /// - `Declaration` if `decl` does not parse
    /// - `DuplicateFunction` if this extension already has the name
    pub fn function<F>(&mut self, decl: &str, body: F) -> Result<&mut Self>
    where
        F: Fn(&mut NativeArgs) -> anyhow::Result<DynValue> + 'static,
    {
        self.add(NativeFunction::declare(decl, body)?)
    }

    /// Add an already-built function.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateFunction` if this extension already has the name.
    pub fn add(&mut self, function: NativeFunction) -> Result<&mut Self> {
        if self.functions.contains_key(function.name()) {
            return Err(BridgeError::DuplicateFunction(function.name().to_string()));
        }
        trace!(extension = %self.name, function = %function.signature(), "declared function");
        self.functions.insert(function.name().to_string(), function);
        Ok(self)
    }

    /// Queue a constant for [`register_constants`](Self::register_constants).
    pub fn constant(&mut self, name: impl Into<String>, value: Constant) -> &mut Self {
        self.constants.push((name.into(), value));
        self
    }

    /// The extension's functions, in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &NativeFunction> {
        self.functions.values()
    }

    /// The function called `name`.
    pub fn get(&self, name: &str) -> Option<&NativeFunction> {
        self.functions.get(name)
    }

    /// The queued constants.
    pub fn constants(&self) -> &[(String, Constant)] {
        &self.constants
    }

    /// Publish the queued constants to the process-wide registry.
    ///
    /// A constant that is already registered with the same value is
    /// skipped, so an extension can be loaded into several contexts.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyDefined` if a name is registered with a different
    /// value.
    pub fn register_constants(&self) -> Result<()> {
        for (name, value) in &self.constants {
            match register_constant(name, *value) {
                Ok(()) => {}
                Err(ConstantError::AlreadyDefined(_))
                    if constant(name).is_some_and(|existing| existing.is_identical(value)) =>
                {
                    trace!(constant = %name, "constant already published");
                }
                Err(err) => return Err(err.into()),
            }
        }
        debug!(
            extension = %self.name,
            constants = self.constants.len(),
            "published constants"
        );
        Ok(())
    }

    pub(crate) fn into_parts(self) -> (String, IndexMap<String, NativeFunction>) {
        (self.name, self.functions)
    }
}
