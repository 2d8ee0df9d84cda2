//! Member access: `obj.name`, `obj.?name` and `obj.name = value`.

use stencil_ir::Token;

use crate::errors::{
    cannot_set_property, get_on_null, read_only_property, set_on_null, undefined_property,
};
use crate::value::{AccessorRegistry, SetFieldError, Value};
use crate::EvalError;

/// Read a member of `object`. A null receiver is an error; optional access
/// checks for null before calling this.
pub fn get_property(
    object: &Value,
    name: &Token,
    registry: &AccessorRegistry,
) -> Result<Value, EvalError> {
    let field = name.lexeme.as_str();
    match object {
        Value::Null => Err(get_on_null(name)),
        Value::Map(map) => Ok(map.get(field).unwrap_or(Value::Null)),
        Value::Host(host) => registry
            .get(host, field)
            .ok_or_else(|| undefined_property(object.type_name(), name)),
        Value::List(items) => match field {
            "size" => Ok(Value::Int(i32::try_from(items.len()).unwrap_or(i32::MAX))),
            "first" => Ok(items.first().cloned().unwrap_or(Value::Null)),
            "last" => Ok(items.last().cloned().unwrap_or(Value::Null)),
            "isEmpty" => Ok(Value::Bool(items.is_empty())),
            _ => Err(undefined_property(object.type_name(), name)),
        },
        Value::Str(s) => match field {
            "length" => Ok(Value::Int(
                i32::try_from(s.chars().count()).unwrap_or(i32::MAX),
            )),
            "isEmpty" => Ok(Value::Bool(s.is_empty())),
            _ => Err(undefined_property(object.type_name(), name)),
        },
        _ => Err(undefined_property(object.type_name(), name)),
    }
}

/// Assign a member of `object`. Only maps and host fields with a setter
/// accept assignment.
pub fn set_property(
    object: &Value,
    name: &Token,
    value: Value,
    registry: &AccessorRegistry,
) -> Result<(), EvalError> {
    let field = name.lexeme.as_str();
    match object {
        Value::Null => Err(set_on_null(name)),
        Value::Map(map) => {
            map.insert(field, value);
            Ok(())
        }
        Value::Host(host) => registry.set(host, field, value).map_err(|err| match err {
            SetFieldError::Undefined => undefined_property(object.type_name(), name),
            SetFieldError::ReadOnly => read_only_property(object.type_name(), name),
            SetFieldError::Rejected(err) => err.at(name),
        }),
        _ => Err(cannot_set_property(object.type_name(), name)),
    }
}
