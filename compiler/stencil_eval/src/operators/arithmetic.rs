//! `+ - * / %` over the numeric tiers, plus string concatenation.

use bigdecimal::{BigDecimal, RoundingMode, Zero};
use stencil_ir::{BinaryOp, Token};

use super::numeric::{as_f32, as_i32, to_decimal, to_f64, to_i64, Tier};
use crate::errors::{division_by_zero, modulo_by_zero};
use crate::value::Value;
use crate::EvalError;

/// Scale of decimal quotients.
const DECIMAL_DIVISION_SCALE: i64 = 10;

pub fn arithmetic(
    left: &Value,
    op: BinaryOp,
    right: &Value,
    token: &Token,
) -> Result<Value, EvalError> {
    let has_decimal = matches!(left, Value::Decimal(_)) || matches!(right, Value::Decimal(_));
    if has_decimal && !left.is_null() && !right.is_null() {
        return decimal_arithmetic(left, op, right, token);
    }

    if let (Some(lt), Some(rt)) = (Tier::of(left), Tier::of(right)) {
        if matches!(op, BinaryOp::Div | BinaryOp::Mod) && is_zero(right) {
            return Err(zero_divisor(op, token));
        }
        return Ok(match lt.max(rt) {
            Tier::Int => int_op(as_i32(left), op, as_i32(right)),
            Tier::Long => long_op(
                to_i64(left).unwrap_or_default(),
                op,
                to_i64(right).unwrap_or_default(),
            ),
            Tier::Float => Value::Float(float_op(as_f32(left), op, as_f32(right))),
            Tier::Double => Value::Double(double_op(
                to_f64(left).unwrap_or_default(),
                op,
                to_f64(right).unwrap_or_default(),
            )),
        });
    }

    if op == BinaryOp::Add && (matches!(left, Value::Str(_)) || matches!(right, Value::Str(_))) {
        return Ok(Value::string(format!("{left}{right}")));
    }

    let name = match op {
        BinaryOp::Sub => "subtraction",
        BinaryOp::Mul => "multiplication",
        BinaryOp::Div => "division",
        BinaryOp::Mod => "modulo",
        _ => "operation",
    };
    Err(EvalError::runtime(
        format!("Operands must be numbers for {name}."),
        token,
    ))
}

fn decimal_arithmetic(
    left: &Value,
    op: BinaryOp,
    right: &Value,
    token: &Token,
) -> Result<Value, EvalError> {
    let (Some(l), Some(r)) = (to_decimal(left), to_decimal(right)) else {
        return Err(EvalError::runtime(
            "Operands must be numbers for arithmetic operations.",
            token,
        ));
    };
    if matches!(op, BinaryOp::Div | BinaryOp::Mod) && r.is_zero() {
        return Err(zero_divisor(op, token));
    }
    let result: BigDecimal = match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => (l / r).with_scale_round(DECIMAL_DIVISION_SCALE, RoundingMode::HalfUp),
        _ => l % r,
    };
    Ok(Value::decimal(result))
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Float(n) => *n == 0.0,
        Value::Double(n) => *n == 0.0,
        other => to_i64(other) == Some(0),
    }
}

fn zero_divisor(op: BinaryOp, token: &Token) -> EvalError {
    if op == BinaryOp::Div {
        division_by_zero(token)
    } else {
        modulo_by_zero(token)
    }
}

fn int_op(l: i32, op: BinaryOp, r: i32) -> Value {
    Value::Int(match op {
        BinaryOp::Add => l.wrapping_add(r),
        BinaryOp::Sub => l.wrapping_sub(r),
        BinaryOp::Mul => l.wrapping_mul(r),
        BinaryOp::Div => l.wrapping_div(r),
        _ => l.wrapping_rem(r),
    })
}

fn long_op(l: i64, op: BinaryOp, r: i64) -> Value {
    Value::Long(match op {
        BinaryOp::Add => l.wrapping_add(r),
        BinaryOp::Sub => l.wrapping_sub(r),
        BinaryOp::Mul => l.wrapping_mul(r),
        BinaryOp::Div => l.wrapping_div(r),
        _ => l.wrapping_rem(r),
    })
}

fn float_op(l: f32, op: BinaryOp, r: f32) -> f32 {
    match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => l / r,
        _ => l % r,
    }
}

fn double_op(l: f64, op: BinaryOp, r: f64) -> f64 {
    match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => l / r,
        _ => l % r,
    }
}
