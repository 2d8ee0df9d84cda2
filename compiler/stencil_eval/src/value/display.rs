//! Default string forms of values.
//!
//! These are the forms used by expression output, string concatenation and
//! `$join`. Floating-point numbers always carry a fractional part and switch
//! to `1.0E7` notation outside `[1e-3, 1e7)`.

use std::fmt::{self, Write};

use chrono::Timelike;

use super::Value;

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Byte(n) => write!(f, "{n}"),
            Value::Short(n) => write!(f, "{n}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Long(n) => write!(f, "{n}"),
            Value::Float(n) => f.write_str(&format_float(*n)),
            Value::Double(n) => f.write_str(&format_double(*n)),
            Value::Decimal(d) => write!(f, "{}", **d),
            Value::Str(s) => f.write_str(s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => {
                write!(f, "{}", dt.format("%Y-%m-%dT%H:%M"))?;
                write_seconds(f, dt.second(), dt.nanosecond())
            }
            Value::Zoned(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%:z")),
            Value::List(items) => {
                f.write_char('[')?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_char(']')
            }
            Value::Map(map) => {
                f.write_char('{')?;
                for (i, (key, value)) in map.snapshot().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}={value}")?;
                }
                f.write_char('}')
            }
            Value::Host(host) => f.write_str(host.type_name()),
            Value::Function(closure) => write!(f, "<fn({})>", closure.params.join(", ")),
            Value::Native(native) => write!(f, "<native fn {}>", native.name()),
            Value::Rewriter(_) => f.write_str("<rewriter>"),
        }
    }
}

/// Seconds are shown only when non-zero, fractions only when present.
fn write_seconds(f: &mut fmt::Formatter<'_>, second: u32, nano: u32) -> fmt::Result {
    if second == 0 && nano == 0 {
        return Ok(());
    }
    write!(f, ":{second:02}")?;
    if nano != 0 {
        let frac = format!("{nano:09}");
        f.write_char('.')?;
        f.write_str(frac.trim_end_matches('0'))?;
    }
    Ok(())
}

pub fn format_double(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    let abs = n.abs();
    if abs == 0.0 || (1e-3..1e7).contains(&abs) {
        with_fraction(n.to_string())
    } else {
        scientific(&format!("{n:e}"))
    }
}

pub fn format_float(n: f32) -> String {
    if n.is_nan() {
        return "NaN".to_owned();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    let abs = n.abs();
    if abs == 0.0 || (1e-3..1e7).contains(&abs) {
        with_fraction(n.to_string())
    } else {
        scientific(&format!("{n:e}"))
    }
}

fn with_fraction(mut s: String) -> String {
    if !s.contains('.') {
        s.push_str(".0");
    }
    s
}

/// `1.5e-5` → `1.5E-5`, `1e7` → `1.0E7`.
fn scientific(s: &str) -> String {
    match s.split_once('e') {
        Some((mantissa, exponent)) => format!("{}E{exponent}", with_fraction(mantissa.to_owned())),
        None => s.to_owned(),
    }
}
