//! Unary minus.

use stencil_ir::Token;

use crate::errors::operand_must_be_number;
use crate::value::Value;
use crate::EvalError;

/// Negate a number. Bytes and shorts widen to int; integers wrap.
pub fn negate(value: &Value, token: &Token) -> Result<Value, EvalError> {
    Ok(match value {
        Value::Byte(n) => Value::Int(-i32::from(*n)),
        Value::Short(n) => Value::Int(-i32::from(*n)),
        Value::Int(n) => Value::Int(n.wrapping_neg()),
        Value::Long(n) => Value::Long(n.wrapping_neg()),
        Value::Float(n) => Value::Float(-n),
        Value::Double(n) => Value::Double(-n),
        Value::Decimal(d) => Value::decimal(-(**d).clone()),
        _ => return Err(operand_must_be_number(token)),
    })
}
