//! Built-in global functions.
//!
//! Every built-in is a [`NativeFunction`](crate::value::NativeFunction)
//! bound under a `$`-prefixed name in the render's global scope, so data
//! keys can never shadow one by accident.

mod casts;
mod collections;
mod format;

use chrono::Local;

use crate::environment::Environment;
use crate::rewriter::{IdentityRewriter, LineBreakRewriter, RawXmlRewriter};
use crate::value::{Arity, Value};
use crate::{NativeError, RenderOptions};

pub use format::{format_date, format_number, NumberSymbols};

/// Names of all built-ins, for seeding the resolver's global scope.
pub const NAMES: &[&str] = &[
    "$map",
    "$filter",
    "$reduce",
    "$sum",
    "$join",
    "$range",
    "$reverse",
    "$enumerate",
    "$filterNotNull",
    "$notNull",
    "$now",
    "$asByte",
    "$asShort",
    "$asInt",
    "$asLong",
    "$asFloat",
    "$asDouble",
    "$asDecimal",
    "$format",
    "$formatDate",
    "$formatNumber",
    "$identity",
    "$rawXml",
    "$lineBreaksToTags",
];

/// Bind every built-in in `env`.
pub fn install(env: &Environment, options: &RenderOptions) {
    let symbols = options.number_symbols;
    let native = |name: &'static str, value: Value| env.define(name, value);

    native("$map", Value::native("$map", Arity::Exact(2), collections::map));
    native("$filter", Value::native("$filter", Arity::Exact(2), collections::filter));
    native("$reduce", Value::native("$reduce", Arity::Range(2, 3), collections::reduce));
    native("$sum", Value::native("$sum", Arity::Exact(1), collections::sum));
    native("$join", Value::native("$join", Arity::Exact(2), collections::join));
    native("$range", Value::native("$range", Arity::Exact(2), collections::range));
    native("$reverse", Value::native("$reverse", Arity::Exact(1), collections::reverse));
    native(
        "$enumerate",
        Value::native("$enumerate", Arity::Exact(1), collections::enumerate),
    );
    native(
        "$filterNotNull",
        Value::native("$filterNotNull", Arity::Exact(1), collections::filter_not_null),
    );
    native(
        "$notNull",
        Value::native("$notNull", Arity::Exact(1), |_, args| {
            Ok(Value::Bool(!args[0].is_null()))
        }),
    );
    native(
        "$now",
        Value::native("$now", Arity::Exact(0), |_, _| {
            Ok(Value::DateTime(Local::now().naive_local()))
        }),
    );

    native("$asByte", Value::native("$asByte", Arity::Exact(1), casts::as_byte));
    native("$asShort", Value::native("$asShort", Arity::Exact(1), casts::as_short));
    native("$asInt", Value::native("$asInt", Arity::Exact(1), casts::as_int));
    native("$asLong", Value::native("$asLong", Arity::Exact(1), casts::as_long));
    native("$asFloat", Value::native("$asFloat", Arity::Exact(1), casts::as_float));
    native("$asDouble", Value::native("$asDouble", Arity::Exact(1), casts::as_double));
    native("$asDecimal", Value::native("$asDecimal", Arity::Exact(1), casts::as_decimal));

    native(
        "$format",
        Value::native("$format", Arity::Range(1, 2), move |_, args| {
            format::format_value(&args[0], args.get(1), symbols)
        }),
    );
    native(
        "$formatDate",
        Value::native("$formatDate", Arity::Exact(2), |_, args| {
            format::format_date_value(&args[0], &args[1])
        }),
    );
    native(
        "$formatNumber",
        Value::native("$formatNumber", Arity::Range(1, 2), move |_, args| {
            format::format_number_value(&args[0], args.get(1), symbols)
        }),
    );

    native(
        "$identity",
        Value::native("$identity", Arity::Exact(0), |_, _| {
            Ok(Value::rewriter(IdentityRewriter))
        }),
    );
    native(
        "$rawXml",
        Value::native("$rawXml", Arity::Exact(1), |_, args| match &args[0] {
            Value::Null => Ok(Value::rewriter(RawXmlRewriter::new(""))),
            Value::Str(xml) => Ok(Value::rewriter(RawXmlRewriter::new(xml.as_str()))),
            other => Err(NativeError::new(format!(
                "$rawXml: expected an XML string, got {}.",
                other.type_name()
            ))),
        }),
    );
    let line_breaks = options.line_breaks.as_ref().map(LineBreakRewriter::new);
    native(
        "$lineBreaksToTags",
        Value::native("$lineBreaksToTags", Arity::Exact(0), move |_, _| {
            match &line_breaks {
                Some(rewriter) => Ok(Value::rewriter(rewriter.clone())),
                None => Err(NativeError::new(
                    "$lineBreaksToTags: no line-break element is configured for this file type.",
                )),
            }
        }),
    );
}

// Argument helpers

pub(crate) fn expect_list<'a>(
    function: &str,
    value: &'a Value,
) -> Result<&'a [Value], NativeError> {
    value.as_list().ok_or_else(|| {
        NativeError::new(format!(
            "{function}: expected a list, got {}.",
            value.type_name()
        ))
    })
}

pub(crate) fn expect_callable(function: &str, value: &Value) -> Result<(), NativeError> {
    if value.is_callable() {
        Ok(())
    } else {
        Err(NativeError::new(format!(
            "{function}: expected a function, got {}.",
            value.type_name()
        )))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
