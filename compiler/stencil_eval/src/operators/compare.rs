//! Ordering comparisons.

use std::cmp::Ordering;

use stencil_ir::Token;

use super::numeric::{to_decimal, to_f64, to_i64};
use crate::value::Value;
use crate::EvalError;

/// Order two values for `< <= > >=`.
pub fn compare(left: &Value, right: &Value, token: &Token) -> Result<Ordering, EvalError> {
    if left.is_number() && right.is_number() {
        return Ok(compare_numbers(left, right));
    }

    let ordering = match (left, right) {
        (Value::Str(a), Value::Str(b)) => Some(a.as_str().cmp(b.as_str())),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        (Value::Zoned(a), Value::Zoned(b)) => Some(a.cmp(b)),
        _ => None,
    };
    if let Some(ordering) = ordering {
        return Ok(ordering);
    }

    if is_orderable(left) && !right.is_null() {
        return Err(EvalError::runtime(
            format!(
                "Operands are not comparable: {} and {}",
                left.type_name(),
                right.type_name()
            ),
            token,
        ));
    }
    Err(EvalError::runtime(
        "Operands must be numbers or comparable types.",
        token,
    ))
}

fn is_orderable(value: &Value) -> bool {
    value.is_number()
        || matches!(
            value,
            Value::Str(_) | Value::Bool(_) | Value::Date(_) | Value::DateTime(_) | Value::Zoned(_)
        )
}

fn compare_numbers(left: &Value, right: &Value) -> Ordering {
    let is_decimal = |v: &Value| matches!(v, Value::Decimal(_));
    let is_floating = |v: &Value| matches!(v, Value::Float(_) | Value::Double(_));

    if is_decimal(left) || is_decimal(right) {
        if let (Some(l), Some(r)) = (to_decimal(left), to_decimal(right)) {
            return l.cmp(&r);
        }
    }
    if is_floating(left) || is_floating(right) || is_decimal(left) || is_decimal(right) {
        let l = to_f64(left).unwrap_or(f64::NAN);
        let r = to_f64(right).unwrap_or(f64::NAN);
        return l.total_cmp(&r);
    }
    to_i64(left).cmp(&to_i64(right))
}
