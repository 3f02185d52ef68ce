//! Error types for value access, declarations, and native-call binding

use thiserror::Error;

use crate::value::{DataType, DynValue};

/// Errors raised by value accessors that distinguish "absent" from "null".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValueError {
    /// Byte offset past the end of a string
    #[error("offset {index} is out of range for a string of length {len}")]
    OutOfRange {
        /// Requested offset
        index: usize,
        /// Logical length of the string
        len: usize,
    },

    /// Strict lookup of a key that is not present
    #[error("undefined array key {key}")]
    MissingKey {
        /// The key that was looked up, as displayed
        key: String,
    },
}

/// Argument or return value does not fit a declared native signature.
///
/// All of these are detected outside the native body: arguments before it
/// runs, the return value right after.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    /// Wrong number of arguments
    #[error("{function}() expects exactly {expected} argument(s), {got} given")]
    ArityMismatch {
        /// Function name
        function: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        got: usize,
    },

    /// Argument has a type the declared parameter cannot accept
    #[error("{function}(): argument #{position} (${param}) must be of type {expected}, {got} given")]
    TypeMismatch {
        /// Function name
        function: String,
        /// Parameter name
        param: String,
        /// 1-based parameter position
        position: usize,
        /// Declared type
        expected: DataType,
        /// Script-facing type name of the supplied value
        got: &'static str,
    },

    /// A by-reference parameter received a plain value
    #[error("{function}(): argument #{position} (${param}) could not be passed by reference")]
    ExpectedReference {
        /// Function name
        function: String,
        /// Parameter name
        param: String,
        /// 1-based parameter position
        position: usize,
    },

    /// Native body returned something other than its declared type
    #[error("{function}(): return value must be of type {expected}, {got} returned")]
    ReturnType {
        /// Function name
        function: String,
        /// Declared return type
        expected: DataType,
        /// Script-facing type name of the returned value
        got: &'static str,
    },

    /// Native code asked for an argument position that was never bound
    #[error("{function}(): argument #{position} does not exist, {count} bound")]
    MissingArgument {
        /// Function name
        function: String,
        /// 1-based position requested
        position: usize,
        /// Number of bound arguments
        count: usize,
    },

    /// No function with this name is loaded
    #[error("call to undefined function {0}()")]
    UndefinedFunction(String),

    /// Native re-entry went deeper than the configured limit
    #[error("maximum call depth of {max} exceeded")]
    CallDepthExceeded {
        /// Configured limit
        max: usize,
    },
}

/// A native function declaration could not be turned into a signature.
#[derive(Error, Debug)]
pub enum DeclarationError {
    /// The declaration is not a well-formed function signature
    #[error("malformed declaration: {0}")]
    Syntax(#[from] syn::Error),

    /// A parameter or return type is not one of the bridge types
    #[error("unknown type `{ty}` in declaration of {function}()")]
    UnknownType {
        /// Function name
        function: String,
        /// The offending type, rendered as source
        ty: String,
    },

    /// A parameter is not a plain `name: type` pair
    #[error("unsupported parameter `{param}` in declaration of {function}()")]
    InvalidParameter {
        /// Function name
        function: String,
        /// The offending parameter, rendered as source
        param: String,
    },

    /// `void` used as a parameter type
    #[error("parameter ${param} of {function}() cannot be void")]
    VoidParameter {
        /// Function name
        function: String,
        /// Parameter name
        param: String,
    },
}

/// Script-local lookup errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvironmentError {
    /// Assignment to a local that was never defined
    #[error("undefined variable ${name}")]
    UndefinedVariable {
        /// Variable name
        name: String,
    },
}

/// Constant registry errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstantError {
    /// Constants are write-once
    #[error("constant {0} already defined")]
    AlreadyDefined(String),
}

/// Main error type for bridge operations
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Value access error
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Argument/return binding error
    #[error(transparent)]
    Binding(#[from] BindingError),

    /// Declaration parse error
    #[error(transparent)]
    Declaration(#[from] DeclarationError),

    /// Script-local error
    #[error(transparent)]
    Environment(#[from] EnvironmentError),

    /// Constant registration error
    #[error(transparent)]
    Constant(#[from] ConstantError),

    /// Two loaded extensions export the same function
    #[error("cannot redeclare function {0}()")]
    DuplicateFunction(String),

    /// Failure raised by native code itself
    #[error("{function}(): {source}")]
    Native {
        /// Function name
        function: String,
        /// Whatever the native body reported
        #[source]
        source: anyhow::Error,
    },
}

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Script-facing type name of a value, as used in error messages.
pub fn type_name(value: &DynValue) -> &'static str {
    value.data_type().name()
}
