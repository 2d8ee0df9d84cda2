//! `$format`, `$formatDate` and `$formatNumber`.

mod date;
mod number;

use crate::operators::to_decimal;
use crate::value::Value;
use crate::NativeError;

use date::DateParts;
use number::NumberPattern;

const DEFAULT_DATE: &str = "yyyy/MM/dd";
const DEFAULT_DATE_TIME: &str = "yyyy/MM/dd HH:mm";
const DEFAULT_INTEGER: &str = "#,##0";
const DEFAULT_FRACTIONAL: &str = "#,##0.00";
const DEFAULT_NUMBER: &str = "#,##0.###";

/// Separators used when formatting numbers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NumberSymbols {
    pub decimal: char,
    pub grouping: char,
}

impl NumberSymbols {
    pub fn new(decimal: char, grouping: char) -> Self {
        NumberSymbols { decimal, grouping }
    }
}

impl Default for NumberSymbols {
    fn default() -> Self {
        NumberSymbols::new('.', ',')
    }
}

/// Format a date, date-time or zoned value with a date pattern. Returns
/// `Ok(None)` for values that are not dates.
pub fn format_date(value: &Value, pattern: &str) -> Result<Option<String>, String> {
    let parts = match value {
        Value::Date(date) => DateParts {
            date: *date,
            time: None,
            offset: None,
        },
        Value::DateTime(dt) => DateParts {
            date: dt.date(),
            time: Some(dt.time()),
            offset: None,
        },
        Value::Zoned(dt) => DateParts {
            date: dt.date_naive(),
            time: Some(dt.time()),
            offset: Some(*dt.offset()),
        },
        _ => return Ok(None),
    };
    date::format_pattern(&parts, pattern).map(Some)
}

/// Format a number with a decimal pattern. Returns `Ok(None)` for values
/// that are not numbers.
pub fn format_number(
    value: &Value,
    pattern: &str,
    symbols: NumberSymbols,
) -> Result<Option<String>, String> {
    let Some(decimal) = to_decimal(value) else {
        return Ok(None);
    };
    let pattern = NumberPattern::parse(pattern)?;
    Ok(Some(pattern.format(&decimal, symbols)))
}

fn pattern_arg<'a>(function: &str, value: Option<&'a Value>) -> Result<Option<&'a str>, NativeError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Str(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(NativeError::new(format!(
            "{function}: pattern must be a string, got {}.",
            other.type_name()
        ))),
    }
}

/// `$format(value, pattern?)`: pick a date or number pattern by type.
pub(super) fn format_value(
    value: &Value,
    pattern: Option<&Value>,
    symbols: NumberSymbols,
) -> Result<Value, NativeError> {
    let pattern = pattern_arg("$format", pattern)?;
    let fail = |message: String| NativeError::new(format!("$format: {message}"));

    let text = match value {
        Value::Null => return Ok(Value::Null),
        Value::Date(_) => format_date(value, pattern.unwrap_or(DEFAULT_DATE)),
        Value::DateTime(_) | Value::Zoned(_) => {
            format_date(value, pattern.unwrap_or(DEFAULT_DATE_TIME))
        }
        Value::Byte(_) | Value::Short(_) | Value::Int(_) | Value::Long(_) => {
            format_number(value, pattern.unwrap_or(DEFAULT_INTEGER), symbols)
        }
        Value::Float(_) | Value::Double(_) | Value::Decimal(_) => {
            format_number(value, pattern.unwrap_or(DEFAULT_FRACTIONAL), symbols)
        }
        other => {
            return Err(NativeError::new(format!(
                "$format: unsupported type {}. Supported types: date, datetime, zoned datetime, \
                 byte, short, int, long, float, double, decimal",
                other.type_name()
            )))
        }
    };
    match text.map_err(fail)? {
        Some(text) => Ok(Value::string(text)),
        None => Ok(Value::Null),
    }
}

/// `$formatDate(date, pattern)`.
pub(super) fn format_date_value(value: &Value, pattern: &Value) -> Result<Value, NativeError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    let pattern = pattern_arg("$formatDate", Some(pattern))?.unwrap_or(DEFAULT_DATE);
    match format_date(value, pattern) {
        Ok(Some(text)) => Ok(Value::string(text)),
        Ok(None) => Err(NativeError::new(format!(
            "$formatDate: can only format date, datetime or zoned datetime values, got {}.",
            value.type_name()
        ))),
        Err(message) => Err(NativeError::new(format!("$formatDate: {message}"))),
    }
}

/// `$formatNumber(number, pattern?)`. Null formats as the empty string.
pub(super) fn format_number_value(
    value: &Value,
    pattern: Option<&Value>,
    symbols: NumberSymbols,
) -> Result<Value, NativeError> {
    if value.is_null() {
        return Ok(Value::string(""));
    }
    let pattern = pattern_arg("$formatNumber", pattern)?.unwrap_or(DEFAULT_NUMBER);
    match format_number(value, pattern, symbols) {
        Ok(Some(text)) => Ok(Value::string(text)),
        Ok(None) => Err(NativeError::new(format!(
            "$formatNumber: expected a number, got {}.",
            value.type_name()
        ))),
        Err(message) => Err(NativeError::new(format!("$formatNumber: {message}"))),
    }
}
