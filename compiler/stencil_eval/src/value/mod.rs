//! Runtime values for the template interpreter.
//!
//! # Heap Values
//!
//! Strings, lists, decimals and closures are stored behind [`Heap`], whose
//! constructor is private to this module. Build them through the factory
//! methods on [`Value`]:
//!
//! ```text
//! let s = Value::string("hello");
//! let xs = Value::list(vec![Value::Int(1), Value::Int(2)]);
//! ```
//!
//! # Thread Safety
//!
//! Every variant is `Send + Sync`. Maps and host objects are the only
//! mutable values (`obj.field = x`); they sit behind `parking_lot::RwLock`
//! so parallel loop bodies can read them concurrently.

mod display;
mod function;
mod heap;
mod host;
mod map;

use std::fmt;
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use parking_lot::RwLock;

use crate::rewriter::XmlStreamRewriter;

pub use display::{format_double, format_float};
pub use function::{Arity, Closure, Invoke, NativeFn, NativeFunction};
pub use heap::Heap;
pub use host::{AccessorRegistry, HostObject, SetFieldError, TypeAccessors};
pub use map::ValueMap;

/// Mutable map shared by every copy of the value.
#[derive(Clone, Default)]
pub struct SharedMap(Arc<RwLock<ValueMap>>);

impl SharedMap {
    pub fn new(map: ValueMap) -> Self {
        SharedMap(Arc::new(RwLock::new(map)))
    }

    /// Value at `key`, cloned out of the lock.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.0.write().insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Copy of the current entries, in insertion order.
    pub fn snapshot(&self) -> ValueMap {
        self.0.read().clone()
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }
}

/// A template runtime value.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),

    // Fixed-width numbers
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),

    /// Arbitrary-precision decimal.
    Decimal(Heap<BigDecimal>),
    Str(Heap<String>),

    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Zoned(DateTime<FixedOffset>),

    List(Heap<Vec<Value>>),
    Map(SharedMap),
    /// Host object whose fields are read through an [`AccessorRegistry`].
    Host(HostObject),

    /// Template lambda with its captured environment.
    Function(Heap<Closure>),
    Native(NativeFunction),
    Rewriter(Arc<dyn XmlStreamRewriter>),
}

// Factory methods

impl Value {
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Heap::new(items))
    }

    #[inline]
    pub fn map(entries: ValueMap) -> Self {
        Value::Map(SharedMap::new(entries))
    }

    #[inline]
    pub fn decimal(d: BigDecimal) -> Self {
        Value::Decimal(Heap::new(d))
    }

    #[inline]
    pub fn closure(closure: Closure) -> Self {
        Value::Function(Heap::new(closure))
    }

    pub fn native(
        name: &'static str,
        arity: Arity,
        func: impl Fn(&dyn Invoke, &[Value]) -> Result<Value, crate::NativeError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        Value::Native(NativeFunction::new(name, arity, func))
    }

    pub fn host<T: std::any::Any + Send + Sync>(value: T) -> Self {
        Value::Host(HostObject::new(value))
    }

    pub fn rewriter(rewriter: impl XmlStreamRewriter + 'static) -> Self {
        Value::Rewriter(Arc::new(rewriter))
    }
}

// Value methods

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Template truthiness: null, `false`, the empty string, numeric zero of
    /// any tier and empty collections are false.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Byte(n) => *n != 0,
            Value::Short(n) => *n != 0,
            Value::Int(n) => *n != 0,
            Value::Long(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Double(n) => *n != 0.0,
            Value::Decimal(d) => !bigdecimal::Zero::is_zero(&**d),
            Value::Str(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            _ => true,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(
            self,
            Value::Byte(_)
                | Value::Short(_)
                | Value::Int(_)
                | Value::Long(_)
                | Value::Float(_)
                | Value::Double(_)
                | Value::Decimal(_)
        )
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Native(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Name of the value's type as used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Byte(_) => "byte",
            Value::Short(_) => "short",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Decimal(_) => "decimal",
            Value::Str(_) => "string",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Zoned(_) => "zoned datetime",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Host(host) => host.type_name(),
            Value::Function(_) | Value::Native(_) => "function",
            Value::Rewriter(_) => "rewriter",
        }
    }

    /// Text emitted by an expression statement: null becomes empty.
    pub fn to_output_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    /// Template equality: numbers compare by value across tiers.
    fn eq(&self, other: &Self) -> bool {
        crate::operators::values_equal(self, other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Byte(n) => write!(f, "Byte({n})"),
            Value::Short(n) => write!(f, "Short({n})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Long(n) => write!(f, "Long({n})"),
            Value::Float(n) => write!(f, "Float({n:?})"),
            Value::Double(n) => write!(f, "Double({n:?})"),
            Value::Decimal(d) => write!(f, "Decimal({})", **d),
            Value::Str(s) => write!(f, "Str({:?})", &**s),
            Value::Date(d) => write!(f, "Date({d})"),
            Value::DateTime(d) => write!(f, "DateTime({d})"),
            Value::Zoned(d) => write!(f, "Zoned({d})"),
            Value::List(items) => f.debug_list().entries(items.iter()).finish(),
            Value::Map(map) => {
                let snapshot = map.snapshot();
                f.debug_map().entries(snapshot.iter()).finish()
            }
            Value::Host(host) => write!(f, "Host({})", host.type_name()),
            Value::Function(closure) => write!(f, "Function({} params)", closure.params.len()),
            Value::Native(native) => write!(f, "Native({})", native.name()),
            Value::Rewriter(_) => f.write_str("Rewriter"),
        }
    }
}

// Conversions

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Long(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Double(n)
    }
}

impl From<BigDecimal> for Value {
    fn from(d: BigDecimal) -> Self {
        Value::decimal(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::DateTime(d)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(d: DateTime<FixedOffset>) -> Self {
        Value::Zoned(d)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::list(items.into_iter().map(Into::into).collect())
    }
}

impl From<ValueMap> for Value {
    fn from(map: ValueMap) -> Self {
        Value::map(map)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
