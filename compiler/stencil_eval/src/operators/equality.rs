//! Template equality.

use std::sync::Arc;

use super::numeric::to_decimal;
use crate::value::{HostObject, NativeFunction, SharedMap, Value};

/// `==` semantics: numbers compare by value across tiers, everything else
/// structurally.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if a.is_number() && b.is_number() {
        return match (to_decimal(a), to_decimal(b)) {
            (Some(x), Some(y)) => x == y,
            // NaN or infinity on at least one side.
            _ => match (super::to_f64(a), super::to_f64(b)) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        };
    }

    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Date(x), Value::Date(y)) => x == y,
        (Value::DateTime(x), Value::DateTime(y)) => x == y,
        (Value::Zoned(x), Value::Zoned(y)) => x == y,
        (Value::List(x), Value::List(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(l, r)| values_equal(l, r))
        }
        (Value::Map(x), Value::Map(y)) => SharedMap::ptr_eq(x, y) || x.snapshot() == y.snapshot(),
        (Value::Host(x), Value::Host(y)) => HostObject::ptr_eq(x, y),
        (Value::Function(x), Value::Function(y)) => x == y,
        (Value::Native(x), Value::Native(y)) => NativeFunction::ptr_eq(x, y),
        (Value::Rewriter(x), Value::Rewriter(y)) => Arc::ptr_eq(x, y),
        _ => false,
    }
}
