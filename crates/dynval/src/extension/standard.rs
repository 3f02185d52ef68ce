//! The standard sample extension

use std::io::Write;

use anyhow::{anyhow, bail};

use super::Extension;
use crate::bridge::NativeArgs;
use crate::constants::Constant;
use crate::error::Result;
use crate::value::{DynString, DynValue};

impl Extension {
    /// Longest string `str_repeat` and `join_digits` will build.
    pub const MAX_STRING_LEN: usize = 16 * 1024 * 1024;

    /// A small library of string, array and type functions, plus the
    /// `DYNVAL_VERSION`, `PHP_INT_MAX` and `M_PI` constants.
    ///
    /// # Errors
    ///
    /// Fails only if one of the built-in declarations does not parse.
    pub fn standard() -> Result<Self> {
        let mut ext = Extension::new("standard");

        // Strings
        ext.function("fn strlen(string: string) -> int", native_strlen)?
            .function(
                "fn str_repeat(string: string, times: int) -> string",
                native_str_repeat,
            )?
            .function("fn join_digits(count: int) -> string", native_join_digits)?;

        // Arrays
        ext.function("fn count(value: array) -> int", native_count)?
            .function(
                "fn array_push(array: &mut array, value: mixed) -> int",
                native_array_push,
            )?
            .function("fn array_shift(array: &mut array) -> mixed", native_array_shift)?;

        // Types
        ext.function("fn gettype(value: mixed) -> string", native_gettype)?
            .function("fn intval(value: mixed) -> int", native_intval)?
            .function("fn is_numeric(value: mixed) -> bool", native_is_numeric)?
            .function("fn settype_int(var: &mut mixed) -> bool", native_settype_int)?;

        ext.constant("DYNVAL_VERSION", Constant::Str(crate::VERSION))
            .constant("PHP_INT_MAX", Constant::Int(i64::MAX))
            .constant("M_PI", Constant::Double(std::f64::consts::PI));

        Ok(ext)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// String Functions
// ═══════════════════════════════════════════════════════════════════════

fn native_strlen(args: &mut NativeArgs) -> anyhow::Result<DynValue> {
    Ok(DynValue::Int(args.string(0)?.len() as i64))
}

/// Sizes the result once, then fills it in place.
fn native_str_repeat(args: &mut NativeArgs) -> anyhow::Result<DynValue> {
    let input = args.string(0)?;
    let times = usize::try_from(args.int(1)?)
        .map_err(|_| anyhow!("argument #2 ($times) must be greater than or equal to 0"))?;

    if input.is_empty() || times == 0 {
        return Ok(DynValue::String(DynString::new()));
    }

    let total = input
        .len()
        .checked_mul(times)
        .filter(|&total| total <= Extension::MAX_STRING_LEN)
        .ok_or_else(too_large)?;

    let mut out = DynString::with_capacity(total);
    let buf = out.mutable_data();
    for chunk in buf[..total].chunks_exact_mut(input.len()) {
        chunk.copy_from_slice(input.as_bytes());
    }
    out.set_size(total);
    Ok(DynValue::String(out))
}

/// `"0, 1, ..., n-1"`: every item is written with its trailing `", "`,
/// and the last separator is dropped by committing a shorter size.
fn native_join_digits(args: &mut NativeArgs) -> anyhow::Result<DynValue> {
    let count = args.int(0)?;
    if count < 0 {
        bail!("argument #1 ($count) must be greater than or equal to 0");
    }
    if count == 0 {
        return Ok(DynValue::String(DynString::new()));
    }

    // Every item takes at least three bytes.
    let count = count as u64;
    if count > (Extension::MAX_STRING_LEN / 3) as u64 {
        return Err(too_large());
    }
    let reserved = (decimal_width_sum(count) + 2 * count) as usize;
    if reserved > Extension::MAX_STRING_LEN {
        return Err(too_large());
    }

    let mut out = DynString::with_capacity(reserved);
    {
        let mut cursor = &mut out.mutable_data()[..reserved];
        for n in 0..count {
            write!(cursor, "{}, ", n)?;
        }
    }
    out.set_size(reserved - 2);
    Ok(DynValue::String(out))
}

/// Bytes needed to print every integer in `0..count` in decimal.
fn decimal_width_sum(count: u64) -> u64 {
    let mut total = 0;
    let mut width = 1;
    let mut start = 0u64;
    let mut end = 10u64;
    while start < count {
        total += (end.min(count) - start) * width;
        start = end;
        end = end.saturating_mul(10);
        width += 1;
    }
    total
}

fn too_large() -> anyhow::Error {
    anyhow!(
        "result would exceed the maximum string length of {} bytes",
        Extension::MAX_STRING_LEN
    )
}

// ═══════════════════════════════════════════════════════════════════════
// Array Functions
// ═══════════════════════════════════════════════════════════════════════

fn native_count(args: &mut NativeArgs) -> anyhow::Result<DynValue> {
    Ok(DynValue::Int(args.array(0)?.count() as i64))
}

fn native_array_push(args: &mut NativeArgs) -> anyhow::Result<DynValue> {
    let value = args.mixed(1)?.clone();
    let mut array = args.array_mut(0)?;
    array.append(value);
    Ok(DynValue::Int(array.count() as i64))
}

fn native_array_shift(args: &mut NativeArgs) -> anyhow::Result<DynValue> {
    let shifted = args.array_mut(0)?.dequeue();
    Ok(DynValue::from(shifted))
}

// ═══════════════════════════════════════════════════════════════════════
// Type Functions
// ═══════════════════════════════════════════════════════════════════════

fn native_gettype(args: &mut NativeArgs) -> anyhow::Result<DynValue> {
    let name = match args.mixed(0)? {
        DynValue::Null => "NULL",
        DynValue::Bool(_) => "boolean",
        DynValue::Int(_) => "integer",
        DynValue::Double(_) => "double",
        DynValue::String(_) => "string",
        DynValue::Array(_) => "array",
        DynValue::Resource(_) => "resource",
        DynValue::Object(_) => "object",
    };
    Ok(DynValue::static_string(name))
}

fn native_intval(args: &mut NativeArgs) -> anyhow::Result<DynValue> {
    Ok(DynValue::Int(args.mixed(0)?.to_int64()))
}

fn native_is_numeric(args: &mut NativeArgs) -> anyhow::Result<DynValue> {
    Ok(DynValue::Bool(args.mixed(0)?.is_numeric(true)))
}

fn native_settype_int(args: &mut NativeArgs) -> anyhow::Result<DynValue> {
    let cell = args.reference(0)?;
    let converted = cell.get().to_int64();
    cell.set(converted);
    Ok(DynValue::Bool(true))
}
