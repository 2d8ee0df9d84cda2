//! Numeric conversion built-ins (`$asInt(x)` and friends).
//!
//! Numbers convert between tiers with truncation toward zero; numeric strings
//! are parsed first. Null passes through as null.

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::operators::{to_decimal, to_f64, to_i64};
use crate::value::{Invoke, Value};
use crate::NativeError;

/// Normalize the argument to a number, or `None` for null.
fn numeric(function: &str, target: &str, value: &Value) -> Result<Option<Value>, NativeError> {
    match value {
        Value::Null => Ok(None),
        v if v.is_number() => Ok(Some(v.clone())),
        Value::Str(s) => BigDecimal::from_str(s.trim())
            .map(|d| Some(Value::decimal(d)))
            .map_err(|_| {
                NativeError::new(format!("{function}: cannot convert '{}' to {target}.", &**s))
            }),
        other => Err(NativeError::new(format!(
            "{function}: cannot convert {} to {target}.",
            other.type_name()
        ))),
    }
}

fn integral(value: &Value) -> i64 {
    to_i64(value).unwrap_or_default()
}

pub(super) fn as_byte(_: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    Ok(numeric("$asByte", "byte", &args[0])?.map_or(Value::Null, |v| {
        Value::Byte(integral(&v) as i8)
    }))
}

pub(super) fn as_short(_: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    Ok(numeric("$asShort", "short", &args[0])?.map_or(Value::Null, |v| {
        Value::Short(integral(&v) as i16)
    }))
}

pub(super) fn as_int(_: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    Ok(numeric("$asInt", "int", &args[0])?.map_or(Value::Null, |v| {
        Value::Int(integral(&v) as i32)
    }))
}

pub(super) fn as_long(_: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    Ok(numeric("$asLong", "long", &args[0])?.map_or(Value::Null, |v| Value::Long(integral(&v))))
}

pub(super) fn as_float(_: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    Ok(numeric("$asFloat", "float", &args[0])?.map_or(Value::Null, |v| {
        Value::Float(to_f64(&v).unwrap_or_default() as f32)
    }))
}

pub(super) fn as_double(_: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    Ok(numeric("$asDouble", "double", &args[0])?.map_or(Value::Null, |v| {
        Value::Double(to_f64(&v).unwrap_or_default())
    }))
}

pub(super) fn as_decimal(_: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    let Some(v) = numeric("$asDecimal", "decimal", &args[0])? else {
        return Ok(Value::Null);
    };
    to_decimal(&v).map(Value::decimal).ok_or_else(|| {
        NativeError::new(format!("$asDecimal: cannot convert {v} to decimal."))
    })
}
