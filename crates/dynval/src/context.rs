//! Execution context: loaded extensions, script locals and call dispatch

use std::cell::{Cell, Ref, RefCell, RefMut};

use indexmap::IndexMap;
use tracing::debug;

use crate::bridge::{call_native, CallArg, NativeFunction};
use crate::environment::Environment;
use crate::error::{BindingError, BridgeError, Result};
use crate::extension::Extension;
use crate::value::DynValue;

/// Configuration for an [`ExecutionContext`].
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// Maximum nesting of native calls (a native body calling back into
    /// the context counts as one level)
    pub max_call_depth: usize,

    /// Log call arguments at `debug` level
    pub trace_calls: bool,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 1000,
            trace_calls: false,
        }
    }
}

impl ContextConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the call depth limit.
    pub fn with_max_call_depth(mut self, max_depth: usize) -> Self {
        self.max_call_depth = max_depth;
        self
    }

    /// Turn argument logging on or off.
    pub fn with_trace_calls(mut self, trace: bool) -> Self {
        self.trace_calls = trace;
        self
    }
}

/// One script execution context.
///
/// Owns the script locals and the table of callable native functions.
/// Values created here are bound to this context and thread; only
/// constants are shared with other contexts.
///
/// All methods take `&self`, so a native body holding an
/// `Rc<ExecutionContext>` may call back into the context it runs in.
/// Dispatch never borrows the locals, so [`env`](Self::env) may be held
/// across a [`call`](Self::call).
///
/// # Example
///
/// ```
/// use dynval::{CallArg, DynValue, ExecutionContext, Extension};
///
/// let ctx = ExecutionContext::new();
/// ctx.load(Extension::standard()?)?;
///
/// ctx.env_mut().define("stack", DynValue::empty_array());
/// let stack = CallArg::local(&ctx.env(), "stack").unwrap();
/// ctx.call("array_push", vec![stack, "x".into()])?;
///
/// let stack = ctx.env().get("stack").unwrap();
/// let len = ctx.call("count", vec![stack.into()])?;
/// assert_eq!(len, DynValue::Int(1));
/// # Ok::<(), dynval::BridgeError>(())
/// ```
#[derive(Debug)]
pub struct ExecutionContext {
    config: ContextConfig,
    env: RefCell<Environment>,
    depth: Cell<usize>,
    functions: RefCell<IndexMap<String, NativeFunction>>,
    extensions: RefCell<Vec<String>>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext {
    /// Create a context with default settings and nothing loaded.
    pub fn new() -> Self {
        Self::with_config(ContextConfig::default())
    }

    /// Create a context with a custom configuration.
    pub fn with_config(config: ContextConfig) -> Self {
        Self {
            config,
            env: RefCell::new(Environment::new()),
            depth: Cell::new(0),
            functions: RefCell::new(IndexMap::new()),
            extensions: RefCell::new(Vec::new()),
        }
    }

    /// The context's configuration.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Borrow the script locals.
    ///
    /// # Panics
    ///
    /// Panics if they are currently borrowed mutably.
    pub fn env(&self) -> Ref<'_, Environment> {
        self.env.borrow()
    }

    /// Mutably borrow the script locals.
    ///
    /// # Panics
    ///
    /// Panics if they are currently borrowed.
    pub fn env_mut(&self) -> RefMut<'_, Environment> {
        self.env.borrow_mut()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Extensions
    // ═══════════════════════════════════════════════════════════════════

    /// Publish an extension's constants and make its functions callable.
    ///
    /// # Errors
    ///
    /// - `DuplicateFunction` if a function is already loaded under the
    ///   same name; nothing from `ext` is loaded in that case
    /// - `Constant` if one of its constants clashes with a different value
    pub fn load(&self, ext: Extension) -> Result<()> {
        {
            let functions = self.functions.borrow();
            if let Some(dup) = ext.functions().find(|f| functions.contains_key(f.name())) {
                return Err(BridgeError::DuplicateFunction(dup.name().to_string()));
            }
        }

        ext.register_constants()?;

        let (name, loaded) = ext.into_parts();
        debug!(extension = %name, functions = loaded.len(), "loading extension");
        self.functions.borrow_mut().extend(loaded);
        self.extensions.borrow_mut().push(name);
        Ok(())
    }

    /// Names of the loaded extensions, in load order.
    pub fn extensions(&self) -> Vec<String> {
        self.extensions.borrow().clone()
    }

    /// Whether a function called `name` is loaded.
    pub fn has_function(&self, name: &str) -> bool {
        self.functions.borrow().contains_key(name)
    }

    /// The loaded function called `name`.
    pub fn function(&self, name: &str) -> Option<NativeFunction> {
        self.functions.borrow().get(name).cloned()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Dispatch
    // ═══════════════════════════════════════════════════════════════════

    /// Call the loaded function `name`.
    ///
    /// # Errors
    ///
    /// - `UndefinedFunction` if nothing by that name is loaded
    /// - `CallDepthExceeded` past the configured nesting limit
    /// - anything [`call_native`] reports
    pub fn call(&self, name: &str, args: Vec<CallArg>) -> Result<DynValue> {
        let func = self
            .function(name)
            .ok_or_else(|| BindingError::UndefinedFunction(name.to_string()))?;

        if self.config.trace_calls {
            debug!(function = name, ?args, "dispatching call");
        }

        let _depth = DepthGuard::enter(&self.depth, self.config.max_call_depth)?;
        call_native(&func, args)
    }

    /// Number of native calls currently running in this context.
    pub fn call_depth(&self) -> usize {
        self.depth.get()
    }
}

/// Counts one level of native call nesting for as long as it lives.
struct DepthGuard<'a> {
    depth: &'a Cell<usize>,
}

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a Cell<usize>, max: usize) -> std::result::Result<Self, BindingError> {
        let current = depth.get();
        if current >= max {
            return Err(BindingError::CallDepthExceeded { max });
        }
        depth.set(current + 1);
        Ok(Self { depth })
    }
}

impl<'a> Drop for DepthGuard<'a> {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
