//! Calling native Rust functions with dynamic arguments
//!
//! A call goes through three steps:
//!
//! 1. **Bind**: each [`CallArg`] is checked against its [`Param`] and
//!    coerced to the declared type. Any mismatch is reported here, before
//!    native code runs.
//! 2. **Run**: the body receives the bound [`NativeArgs`] and returns
//!    `anyhow::Result<DynValue>`.
//! 3. **Check**: the returned value must match the declared return type.

mod args;
mod function;
mod signature;

pub use args::{CallArg, NativeArgs};
pub use function::{NativeFnPtr, NativeFunction};
pub use signature::{Param, Signature};

use tracing::debug;

use crate::error::{type_name, BindingError, BridgeError, Result};
use crate::value::{DataType, DynValue};
use args::Bound;

/// Call `func` with `args`.
///
/// # Errors
///
/// - `Binding` errors for arity, type or by-reference mismatches, raised
///   before the body runs, and for a return value of the wrong type
/// - `Native` for a failure reported by the body itself
pub fn call_native(func: &NativeFunction, args: Vec<CallArg>) -> Result<DynValue> {
    let sig = func.signature();

    let bound = bind(sig, args).map_err(|err| {
        debug!(function = %sig.name, error = %err, "argument binding failed");
        err
    })?;

    debug!(function = %sig.name, args = bound.len(), "calling native function");
    let mut native_args = NativeArgs::new(sig.name.clone(), sig.params.clone(), bound);

    let ret = (func.body())(&mut native_args).map_err(|source| {
        debug!(function = %sig.name, error = %source, "native function failed");
        BridgeError::Native {
            function: sig.name.clone(),
            source,
        }
    })?;

    check_return(sig, &ret)?;
    debug!(function = %sig.name, ret = type_name(&ret), "native function returned");
    Ok(ret)
}

/// Match arguments to parameters, coercing by-value scalars.
fn bind(sig: &Signature, args: Vec<CallArg>) -> std::result::Result<Vec<Bound>, BindingError> {
    if args.len() != sig.params.len() {
        return Err(BindingError::ArityMismatch {
            function: sig.name.clone(),
            expected: sig.params.len(),
            got: args.len(),
        });
    }

    sig.params
        .iter()
        .zip(args)
        .enumerate()
        .map(|(i, (param, arg))| bind_one(&sig.name, i + 1, param, arg))
        .collect()
}

fn bind_one(
    function: &str,
    position: usize,
    param: &Param,
    arg: CallArg,
) -> std::result::Result<Bound, BindingError> {
    if param.by_ref {
        let cell = match arg {
            CallArg::Ref(cell) => cell,
            CallArg::Value(_) => {
                return Err(BindingError::ExpectedReference {
                    function: function.to_string(),
                    param: param.name.clone(),
                    position,
                })
            }
        };
        // Typed reference cells are checked as-is; nothing is coerced in
        // the caller's slot.
        if param.ty != DataType::Mixed {
            let current = cell.borrow();
            if current.data_type() != param.ty {
                return Err(BindingError::TypeMismatch {
                    function: function.to_string(),
                    param: param.name.clone(),
                    position,
                    expected: param.ty,
                    got: type_name(&current),
                });
            }
        }
        return Ok(Bound::Ref(cell));
    }

    let value = match arg {
        CallArg::Value(v) => v,
        CallArg::Ref(cell) => cell.get(),
    };

    coerce(&value, param.ty)
        .map(Bound::Value)
        .ok_or_else(|| BindingError::TypeMismatch {
            function: function.to_string(),
            param: param.name.clone(),
            position,
            expected: param.ty,
            got: type_name(&value),
        })
}

/// The value as the declared type sees it, or `None` if it cannot accept
/// it at all.
fn coerce(value: &DynValue, ty: DataType) -> Option<DynValue> {
    if ty.is_primitive() && !value.is_scalar() {
        return None;
    }
    match ty {
        DataType::Mixed => Some(value.clone()),
        DataType::Bool => Some(DynValue::Bool(value.to_boolean())),
        DataType::Int => Some(DynValue::Int(value.to_int64())),
        DataType::Float => Some(DynValue::Double(value.to_double())),
        DataType::String => Some(DynValue::String(value.to_dyn_string())),
        DataType::Array | DataType::Resource | DataType::Object => {
            (value.data_type() == ty).then(|| value.clone())
        }
        DataType::Void => None,
    }
}

fn check_return(sig: &Signature, ret: &DynValue) -> std::result::Result<(), BindingError> {
    let ok = match sig.ret {
        DataType::Mixed => true,
        expected => ret.data_type() == expected,
    };
    if ok {
        Ok(())
    } else {
        Err(BindingError::ReturnType {
            function: sig.name.clone(),
            expected: sig.ret,
            got: type_name(ret),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueRef;
    use std::cell::Cell;
    use std::rc::Rc;

    fn echo(decl: &str) -> NativeFunction {
        NativeFunction::declare(decl, |args| Ok(args.mixed(0)?.clone())).unwrap()
    }

    #[test]
    fn test_scalar_coercion() {
        let f = echo("fn f(x: int) -> int");
        assert_eq!(f.call(vec!["42".into()]).unwrap(), DynValue::Int(42));
        assert_eq!(f.call(vec![true.into()]).unwrap(), DynValue::Int(1));
        assert_eq!(f.call(vec![DynValue::Null.into()]).unwrap(), DynValue::Int(0));

        let f = echo("fn f(x: string) -> string");
        assert_eq!(f.call(vec![1.5f64.into()]).unwrap(), DynValue::from("1.5"));
    }

    #[test]
    fn test_array_rejected_for_scalar_param() {
        let f = echo("fn f(x: int) -> int");
        let err = f.call(vec![DynValue::empty_array().into()]).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Binding(BindingError::TypeMismatch {
                expected: DataType::Int,
                got: "array",
                ..
            })
        ));
    }

    #[test]
    fn test_exact_variant_required() {
        let f = echo("fn f(x: array) -> array");
        assert!(f.call(vec!["a".into()]).is_err());
        assert!(f.call(vec![DynValue::empty_array().into()]).is_ok());
    }

    #[test]
    fn test_body_not_run_on_binding_error() {
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let f = NativeFunction::declare("fn f(x: int)", move |_| {
            flag.set(true);
            Ok(DynValue::Null)
        })
        .unwrap();

        assert!(f.call(vec![]).is_err());
        assert!(f.call(vec![DynValue::empty_array().into()]).is_err());
        assert!(!ran.get());

        f.call(vec![1i64.into()]).unwrap();
        assert!(ran.get());
    }

    #[test]
    fn test_typed_reference_checked_before_body() {
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        let f = NativeFunction::declare("fn f(a: &mut array) -> int", move |_| {
            flag.set(true);
            Ok(DynValue::Int(0))
        })
        .unwrap();

        let cell = ValueRef::new(5i64);
        let err = f.call(vec![(&cell).into()]).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::Binding(BindingError::TypeMismatch {
                expected: DataType::Array,
                got: "int",
                position: 1,
                ..
            })
        ));
        assert!(!ran.get());
        assert_eq!(cell.get(), DynValue::Int(5));

        let cell = ValueRef::new(DynValue::empty_array());
        f.call(vec![(&cell).into()]).unwrap();
        assert!(ran.get());
    }

    #[test]
    fn test_mixed_reference_accepts_anything() {
        let f = NativeFunction::declare("fn f(v: &mut mixed)", |args| {
            args.reference(0)?.set(DynValue::Null);
            Ok(DynValue::Null)
        })
        .unwrap();
        let cell = ValueRef::new("anything");
        f.call(vec![(&cell).into()]).unwrap();
        assert_eq!(cell.get(), DynValue::Null);
    }

    #[test]
    fn test_return_type_checked() {
        let f = NativeFunction::declare("fn f() -> int", |_| Ok(DynValue::from("1"))).unwrap();
        assert!(matches!(
            f.call(vec![]),
            Err(BridgeError::Binding(BindingError::ReturnType { got: "string", .. }))
        ));

        let f = NativeFunction::declare("fn f()", |_| Ok(DynValue::Int(0))).unwrap();
        assert!(f.call(vec![]).is_err());
    }

    #[test]
    fn test_native_failure_wrapped() {
        let f = NativeFunction::declare("fn f() -> mixed", |_| anyhow::bail!("disk on fire")).unwrap();
        let err = f.call(vec![]).unwrap_err();
        assert!(matches!(err, BridgeError::Native { ref function, .. } if function == "f"));
        assert_eq!(err.to_string(), "f(): disk on fire");
    }
}
