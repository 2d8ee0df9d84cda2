//! Numeric coercion helpers.

use std::str::FromStr;

use bigdecimal::{BigDecimal, ToPrimitive};

use crate::value::Value;

/// Fixed-width promotion tier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(super) enum Tier {
    Int,
    Long,
    Float,
    Double,
}

impl Tier {
    pub(super) fn of(value: &Value) -> Option<Tier> {
        match value {
            Value::Byte(_) | Value::Short(_) | Value::Int(_) => Some(Tier::Int),
            Value::Long(_) => Some(Tier::Long),
            Value::Float(_) => Some(Tier::Float),
            Value::Double(_) => Some(Tier::Double),
            _ => None,
        }
    }
}

/// Widen a fixed-width number to `i32`. Callers check the tier first.
pub(super) fn as_i32(value: &Value) -> i32 {
    match value {
        Value::Byte(n) => i32::from(*n),
        Value::Short(n) => i32::from(*n),
        Value::Int(n) => *n,
        _ => 0,
    }
}

pub(super) fn as_f32(value: &Value) -> f32 {
    match value {
        Value::Float(n) => *n,
        Value::Long(n) => *n as f32,
        other => as_i32(other) as f32,
    }
}

/// Lossy `i64` view of any number. Decimals and floats truncate.
pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Byte(n) => Some(i64::from(*n)),
        Value::Short(n) => Some(i64::from(*n)),
        Value::Int(n) => Some(i64::from(*n)),
        Value::Long(n) => Some(*n),
        Value::Float(n) => Some(*n as i64),
        Value::Double(n) => Some(*n as i64),
        Value::Decimal(d) => d.with_scale(0).to_i64(),
        _ => None,
    }
}

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float(n) => Some(f64::from(*n)),
        Value::Double(n) => Some(*n),
        Value::Decimal(d) => d.to_f64(),
        other => to_i64(other).map(|n| n as f64),
    }
}

/// Exact decimal view of a number. Floating-point values convert through
/// their shortest round-trip string, so `0.1f` becomes `0.1`.
pub fn to_decimal(value: &Value) -> Option<BigDecimal> {
    match value {
        Value::Byte(n) => Some(BigDecimal::from(*n)),
        Value::Short(n) => Some(BigDecimal::from(*n)),
        Value::Int(n) => Some(BigDecimal::from(*n)),
        Value::Long(n) => Some(BigDecimal::from(*n)),
        Value::Float(n) if n.is_finite() => BigDecimal::from_str(&n.to_string()).ok(),
        Value::Double(n) if n.is_finite() => BigDecimal::from_str(&n.to_string()).ok(),
        Value::Decimal(d) => Some((**d).clone()),
        _ => None,
    }
}
