//! Operator semantics.
//!
//! Direct enum dispatch over [`BinaryOp`] and the fixed set of numeric tiers.
//! Numeric promotion follows one ladder for arithmetic and comparison:
//! decimal, then double, then float, then long, then int. Bytes and shorts
//! always widen to int.

mod arithmetic;
mod compare;
mod equality;
mod numeric;
mod unary;

use stencil_ir::{BinaryOp, Token};

use crate::value::Value;
use crate::EvalError;

pub use arithmetic::arithmetic;
pub use compare::compare;
pub use equality::values_equal;
pub use numeric::{to_decimal, to_f64, to_i64};
pub use unary::negate;

/// Evaluate `left op right`. `token` is the operator token errors bind to.
pub fn evaluate_binary(
    left: &Value,
    op: BinaryOp,
    right: &Value,
    token: &Token,
) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            arithmetic(left, op, right, token)
        }
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = compare(left, right, token)?;
            Ok(Value::Bool(match op {
                BinaryOp::Lt => ordering.is_lt(),
                BinaryOp::LtEq => ordering.is_le(),
                BinaryOp::Gt => ordering.is_gt(),
                _ => ordering.is_ge(),
            }))
        }
        BinaryOp::Eq => Ok(Value::Bool(values_equal(left, right))),
        BinaryOp::NotEq => Ok(Value::Bool(!values_equal(left, right))),
    }
}
