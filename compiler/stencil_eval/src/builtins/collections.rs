//! List built-ins.
//!
//! A null list argument yields null (or an empty result for `$sum`), so
//! optional data can be piped through without guards.

use bigdecimal::BigDecimal;

use super::{expect_callable, expect_list};
use crate::operators::{to_decimal, to_f64, to_i64};
use crate::value::{Invoke, Value, ValueMap};
use crate::NativeError;

pub(super) fn map(invoker: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    if args[0].is_null() {
        return Ok(Value::Null);
    }
    let items = expect_list("$map", &args[0])?;
    expect_callable("$map", &args[1])?;
    let mapped = items
        .iter()
        .map(|item| invoker.invoke(&args[1], vec![item.clone()]))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::list(mapped))
}

pub(super) fn filter(invoker: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    if args[0].is_null() {
        return Ok(Value::Null);
    }
    let items = expect_list("$filter", &args[0])?;
    expect_callable("$filter", &args[1])?;
    let mut kept = Vec::new();
    for item in items {
        if invoker.invoke(&args[1], vec![item.clone()])?.is_truthy() {
            kept.push(item.clone());
        }
    }
    Ok(Value::list(kept))
}

/// `$reduce(list, f, initial?)`. Without an initial value the first element
/// seeds the accumulator; an empty list then reduces to null.
pub(super) fn reduce(invoker: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    if args[0].is_null() {
        return Ok(args.get(2).cloned().unwrap_or(Value::Null));
    }
    let items = expect_list("$reduce", &args[0])?;
    expect_callable("$reduce", &args[1])?;
    let (mut acc, rest) = match args.get(2) {
        Some(initial) => (initial.clone(), items),
        None => match items.split_first() {
            Some((first, rest)) => (first.clone(), rest),
            None => return Ok(Value::Null),
        },
    };
    for item in rest {
        acc = invoker.invoke(&args[1], vec![acc, item.clone()])?;
    }
    Ok(acc)
}

/// Sum as a double, or as a decimal if any element is a decimal. Null
/// elements are skipped.
pub(super) fn sum(_: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    if args[0].is_null() {
        return Ok(Value::Int(0));
    }
    let items = expect_list("$sum", &args[0])?;
    let numbers: Vec<&Value> = items.iter().filter(|v| !v.is_null()).collect();
    if let Some(bad) = numbers.iter().find(|v| !v.is_number()) {
        return Err(NativeError::new(format!(
            "$sum: expected a list of numbers, found {}.",
            bad.type_name()
        )));
    }

    if numbers.iter().any(|v| matches!(v, Value::Decimal(_))) {
        let total = numbers
            .iter()
            .filter_map(|v| to_decimal(v))
            .fold(BigDecimal::from(0), |acc, d| acc + d);
        return Ok(Value::decimal(total));
    }
    // `Sum` for floats starts from -0.0.
    let total = numbers
        .iter()
        .filter_map(|v| to_f64(v))
        .fold(0.0, |acc, n| acc + n);
    Ok(Value::Double(total))
}

pub(super) fn join(_: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    if args[0].is_null() {
        return Ok(Value::Null);
    }
    let items = expect_list("$join", &args[0])?;
    let separator = args[1].to_output_string();
    let joined = items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&separator);
    Ok(Value::string(joined))
}

/// `$range(start, end)`: integers from `start` up to, not including, `end`.
pub(super) fn range(_: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    let bound = |value: &Value| {
        match value {
            Value::Byte(_) | Value::Short(_) | Value::Int(_) | Value::Long(_) => to_i64(value),
            _ => None,
        }
        .ok_or_else(|| {
            NativeError::new(format!(
                "$range: expected integer bounds, got {}.",
                value.type_name()
            ))
        })
    };
    let (start, end) = (bound(&args[0])?, bound(&args[1])?);
    let long = matches!(args[0], Value::Long(_)) || matches!(args[1], Value::Long(_));
    let items = (start..end)
        .map(|n| match i32::try_from(n) {
            Ok(n) if !long => Value::Int(n),
            _ => Value::Long(n),
        })
        .collect();
    Ok(Value::list(items))
}

pub(super) fn reverse(_: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    match &args[0] {
        Value::Null => Ok(Value::Null),
        Value::Str(s) => Ok(Value::string(s.chars().rev().collect::<String>())),
        other => {
            let items = expect_list("$reverse", other)?;
            Ok(Value::list(items.iter().rev().cloned().collect()))
        }
    }
}

/// Wrap each element as `{index, value, isFirst, isLast, isEven}`.
pub(super) fn enumerate(_: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    if args[0].is_null() {
        return Ok(Value::Null);
    }
    let items = expect_list("$enumerate", &args[0])?;
    let last = items.len().saturating_sub(1);
    let entries = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let mut entry = ValueMap::new();
            entry.insert("index", Value::Int(i32::try_from(i).unwrap_or(i32::MAX)));
            entry.insert("value", item.clone());
            entry.insert("isFirst", Value::Bool(i == 0));
            entry.insert("isLast", Value::Bool(i == last));
            entry.insert("isEven", Value::Bool(i % 2 == 0));
            Value::map(entry)
        })
        .collect();
    Ok(Value::list(entries))
}

pub(super) fn filter_not_null(_: &dyn Invoke, args: &[Value]) -> Result<Value, NativeError> {
    if args[0].is_null() {
        return Ok(Value::Null);
    }
    let items = expect_list("$filterNotNull", &args[0])?;
    Ok(Value::list(
        items.iter().filter(|v| !v.is_null()).cloned().collect(),
    ))
}
