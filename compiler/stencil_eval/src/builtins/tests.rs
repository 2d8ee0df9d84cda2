use pretty_assertions::assert_eq;

use super::*;
use crate::value::Invoke;

/// Invokes natives directly; closures need a full interpreter and are
/// covered by the interpreter tests.
struct NativeOnly;

impl Invoke for NativeOnly {
    fn invoke(&self, callee: &Value, args: Vec<Value>) -> Result<Value, NativeError> {
        match callee {
            Value::Native(native) if native.arity().accepts(args.len()) => {
                native.call(self, &args)
            }
            _ => Err(NativeError::new("not callable in tests")),
        }
    }
}

fn globals() -> Environment {
    let env = Environment::new();
    install(&env, &RenderOptions::default());
    env
}

fn call(name: &str, args: Vec<Value>) -> Result<Value, NativeError> {
    let callee = globals().get(name).unwrap();
    NativeOnly.invoke(&callee, args)
}

fn ok(name: &str, args: Vec<Value>) -> Value {
    call(name, args).unwrap()
}

fn double() -> Value {
    Value::native("double", Arity::Exact(1), |_, args| {
        Ok(Value::Int(crate::operators::to_i64(&args[0]).unwrap_or_default() as i32 * 2))
    })
}

fn add() -> Value {
    Value::native("add", Arity::Exact(2), |_, args| {
        Ok(Value::Long(
            crate::operators::to_i64(&args[0]).unwrap_or_default()
                + crate::operators::to_i64(&args[1]).unwrap_or_default(),
        ))
    })
}

#[test]
fn test_install_defines_every_name() {
    let env = globals();
    let mut defined = env.names();
    defined.sort();
    let mut expected: Vec<String> = NAMES.iter().map(|n| (*n).to_owned()).collect();
    expected.sort();
    assert_eq!(defined, expected);
    assert!(NAMES.iter().all(|n| n.starts_with('$')));
}

#[test]
fn test_map_filter_reduce() {
    let xs = Value::from(vec![1, 2, 3]);
    assert_eq!(ok("$map", vec![xs.clone(), double()]).to_string(), "[2, 4, 6]");

    let not_null = globals().get("$notNull").unwrap();
    let with_nulls = Value::list(vec![Value::Int(1), Value::Null, Value::Int(3)]);
    assert_eq!(
        ok("$filter", vec![with_nulls, not_null]).to_string(),
        "[1, 3]"
    );

    assert_eq!(ok("$reduce", vec![xs.clone(), add(), Value::Int(10)]), Value::Int(16));
    assert_eq!(ok("$reduce", vec![xs, add()]), Value::Int(6));
    assert_eq!(ok("$reduce", vec![Value::list(vec![]), add()]), Value::Null);
    assert_eq!(ok("$map", vec![Value::Null, double()]), Value::Null);

    let err = call("$map", vec![Value::Int(1), double()]).unwrap_err();
    assert_eq!(err.to_string(), "$map: expected a list, got int.");
    let err = call("$filter", vec![Value::from(vec![1]), Value::Int(1)]).unwrap_err();
    assert_eq!(err.to_string(), "$filter: expected a function, got int.");
}

#[test]
fn test_sum() {
    let sum = |v: Value| ok("$sum", vec![v]).to_string();
    assert_eq!(sum(Value::from(vec![1, 2, 3, 4])), "10.0");
    assert_eq!(
        sum(Value::list(vec![Value::Int(1), Value::Double(2.5), Value::Int(3)])),
        "6.5"
    );
    assert_eq!(sum(Value::list(vec![])), "0.0");
    assert_eq!(sum(Value::Null), "0");
    assert_eq!(
        sum(Value::list(vec![Value::Int(1), Value::Null, Value::Int(2)])),
        "3.0"
    );
    assert!(matches!(
        ok(
            "$sum",
            vec![Value::list(vec![
                Value::Int(1),
                Value::decimal(bigdecimal::BigDecimal::from(2))
            ])]
        ),
        Value::Decimal(_)
    ));
    assert!(call("$sum", vec![Value::from(vec!["a"])]).is_err());
}

#[test]
fn test_join_range_reverse() {
    let fruits = Value::from(vec!["apple", "banana", "cherry"]);
    assert_eq!(
        ok("$join", vec![fruits, Value::string(", ")]),
        Value::string("apple, banana, cherry")
    );
    assert_eq!(
        ok("$range", vec![Value::Int(1), Value::Int(4)]).to_string(),
        "[1, 2, 3]"
    );
    assert_eq!(
        ok("$range", vec![Value::Int(4), Value::Int(1)]).to_string(),
        "[]"
    );
    assert!(matches!(
        ok("$range", vec![Value::Int(0), Value::Long(1)]).as_list().unwrap()[0],
        Value::Long(0)
    ));
    assert!(call("$range", vec![Value::Double(1.0), Value::Int(3)]).is_err());
    assert_eq!(
        ok("$reverse", vec![Value::from(vec![1, 2, 3])]).to_string(),
        "[3, 2, 1]"
    );
    assert_eq!(ok("$reverse", vec![Value::string("abc")]), Value::string("cba"));
}

#[test]
fn test_enumerate() {
    let items = ok("$enumerate", vec![Value::from(vec!["a", "b", "c"])]);
    let rendered: Vec<String> = items
        .as_list()
        .unwrap()
        .iter()
        .map(|entry| {
            let Value::Map(map) = entry else {
                panic!("expected map");
            };
            let field = |k: &str| map.get(k).unwrap().to_string();
            format!(
                "{}:{}:{}:{}:{}",
                field("index"),
                field("value"),
                field("isFirst"),
                field("isLast"),
                field("isEven")
            )
        })
        .collect();
    assert_eq!(
        rendered,
        vec![
            "0:a:true:false:true",
            "1:b:false:false:false",
            "2:c:false:true:true"
        ]
    );
}

#[test]
fn test_filter_not_null_and_not_null() {
    let items = Value::list(vec![Value::Int(1), Value::Null, Value::Int(2)]);
    assert_eq!(ok("$filterNotNull", vec![items]).to_string(), "[1, 2]");
    assert_eq!(ok("$notNull", vec![Value::Null]), Value::Bool(false));
    assert_eq!(ok("$notNull", vec![Value::Int(0)]), Value::Bool(true));
}

#[test]
fn test_casts() {
    let n = Value::Double(42.5);
    let casts: Vec<String> = [
        "$asByte", "$asShort", "$asInt", "$asLong", "$asFloat", "$asDouble",
    ]
    .iter()
    .map(|name| ok(name, vec![n.clone()]).to_string())
    .collect();
    assert_eq!(casts.join(","), "42,42,42,42,42.5,42.5");

    assert!(matches!(ok("$asInt", vec![Value::string(" 17 ")]), Value::Int(17)));
    assert_eq!(ok("$asDecimal", vec![Value::string("10.50")]).to_string(), "10.50");
    assert_eq!(ok("$asDecimal", vec![Value::Double(0.1)]).to_string(), "0.1");
    assert_eq!(ok("$asLong", vec![Value::Null]), Value::Null);
    assert_eq!(
        call("$asInt", vec![Value::string("abc")]).unwrap_err().to_string(),
        "$asInt: cannot convert 'abc' to int."
    );
    assert!(call("$asInt", vec![Value::Bool(true)]).is_err());
}

#[test]
fn test_rewriter_builtins() {
    assert!(matches!(ok("$identity", vec![]), Value::Rewriter(_)));
    assert!(matches!(
        ok("$rawXml", vec![Value::string("<w:p/>")]),
        Value::Rewriter(_)
    ));
    assert!(call("$rawXml", vec![Value::Int(1)]).is_err());
}

#[test]
fn test_line_breaks_to_tags_needs_configuration() {
    let err = call("$lineBreaksToTags", vec![]).unwrap_err();
    assert!(err.to_string().contains("no line-break element"));

    let env = Environment::new();
    let options = RenderOptions {
        line_breaks: Some(crate::LineBreaks::new("w:br", ["w:t"])),
        ..RenderOptions::default()
    };
    install(&env, &options);
    let callee = env.get("$lineBreaksToTags").unwrap();
    assert!(matches!(
        NativeOnly.invoke(&callee, vec![]).unwrap(),
        Value::Rewriter(_)
    ));
}

#[test]
fn test_now_is_a_datetime() {
    assert!(matches!(ok("$now", vec![]), Value::DateTime(_)));
}

#[test]
fn test_format_through_globals() {
    assert_eq!(
        ok("$format", vec![Value::Int(1_234_567)]),
        Value::string("1,234,567")
    );
    assert_eq!(
        ok("$formatNumber", vec![Value::Double(1234.5), Value::string("#,##0.00")]),
        Value::string("1,234.50")
    );
    assert_eq!(
        call("$format", vec![Value::list(vec![])]).unwrap_err().to_string(),
        "$format: unsupported type list. Supported types: date, datetime, zoned datetime, \
         byte, short, int, long, float, double, decimal"
    );
}
