//! Native function values

use std::fmt;
use std::rc::Rc;

use crate::error::{DeclarationError, Result};
use crate::value::DynValue;

use super::{call_native, CallArg, NativeArgs, Signature};

/// Type alias for native function bodies
pub type NativeFnPtr = Rc<dyn Fn(&mut NativeArgs) -> anyhow::Result<DynValue>>;

/// A native function: its declared signature plus the Rust body.
///
/// Cloning is cheap and shares the body.
#[derive(Clone)]
pub struct NativeFunction {
    signature: Signature,
    body: NativeFnPtr,
}

impl NativeFunction {
    /// Pair a signature with a body.
    pub fn new<F>(signature: Signature, body: F) -> Self
    where
        F: Fn(&mut NativeArgs) -> anyhow::Result<DynValue> + 'static,
    {
        Self {
            signature,
            body: Rc::new(body),
        }
    }

    /// Parse `decl` with [`Signature::parse`] and pair it with `body`.
    pub fn declare<F>(decl: &str, body: F) -> std::result::Result<Self, DeclarationError>
    where
        F: Fn(&mut NativeArgs) -> anyhow::Result<DynValue> + 'static,
    {
        Ok(Self::new(Signature::parse(decl)?, body))
    }

    /// Function name
    pub fn name(&self) -> &str {
        &self.signature.name
    }

    /// Declared signature
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn body(&self) -> &NativeFnPtr {
        &self.body
    }

    /// Bind `args` and run the body. See [`call_native`].
    pub fn call(&self, args: Vec<CallArg>) -> Result<DynValue> {
        call_native(self, args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({})", self.signature)
    }
}
