//! # dynval
//!
//! Dynamic values for calling native Rust code from a script runtime.
//!
//! The crate provides the values that cross the boundary between a
//! loosely typed script and native functions, and the contract for
//! passing them:
//!
//! - [`DynString`]: reference-counted, copy-on-write byte strings
//! - [`DynArray`]: ordered hybrid arrays usable as vector, map or set
//! - [`DynValue`]: the tagged union over all value kinds, with a fixed
//!   coercion table
//! - [`bridge`]: binding [`CallArg`]s to a declared [`Signature`] and
//!   running a [`NativeFunction`]
//! - [`Extension`] and [`ExecutionContext`]: loading functions and
//!   process-wide [`constants`], and dispatching calls
//!
//! ## Threading
//!
//! Values are `Rc`-based and stay on the thread of the context that made
//! them. Interned names and registered constants are the only state shared
//! between threads.
//!
//! ## Logging
//!
//! The crate emits `tracing` events (copy-on-write clones at `trace`,
//! call dispatch at `debug`) and installs no subscriber.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bridge;
pub mod constants;
pub mod context;
pub mod environment;
pub mod error;
pub mod extension;
pub mod value;

// Re-export main types
pub use bridge::{call_native, CallArg, NativeArgs, NativeFnPtr, NativeFunction, Param, Signature};
pub use constants::{constant, intern, register_constant, Constant};
pub use context::{ContextConfig, ExecutionContext};
pub use environment::Environment;
pub use error::{
    type_name, BindingError, BridgeError, ConstantError, DeclarationError, EnvironmentError,
    Result, ValueError,
};
pub use extension::Extension;
pub use value::{
    ArrayKey, DataType, DynArray, DynString, DynValue, ObjectHandle, ResourceHandle, SharedBuffer,
    ValueRef,
};

/// dynval version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
