//! Rendering through a full document.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use stencil::{Data, TemplateOptions, Value, ValueMap};

use crate::common::{compile_with, document, paragraph, render_run, render_text};

fn person(first: &str, last: &str) -> Value {
    Value::map(ValueMap::from_iter([
        ("firstName", Value::from(first)),
        ("lastName", Value::from(last)),
    ]))
}

#[test]
fn test_placeholders_are_replaced_and_escaped() {
    let data = Data::new()
        .with("firstName", "John")
        .with("lastName", "Doe & Doe");
    assert_eq!(
        render_text("{firstName} {lastName}", &data),
        document(&paragraph("John Doe &amp; Doe"))
    );
}

#[test]
fn test_for_loop_with_dot_notation() {
    let data = Data::new().with(
        "people",
        Value::list(vec![person("John", "Doe"), person("Mary", "Jane")]),
    );
    assert_eq!(
        render_run("{for p in people}{p.firstName} {p.lastName}, {end}", &data),
        "John Doe, Mary Jane, "
    );
}

#[test]
fn test_case_expression() {
    let text = r#"Status: {case when status == "error" then "red" when status == "warning" then "yellow" else "green" end}"#;
    let data = Data::new().with("status", "warning");
    assert_eq!(render_run(text, &data), "Status: yellow");

    let data = Data::new().with("x", 5);
    assert_eq!(
        render_run(r#"Result: {case when x > 10 then "high" else "low" end}"#, &data),
        "Result: low"
    );
    assert_eq!(
        render_run(r#"Value: {case when x > 10 then "match" end}"#, &data),
        "Value: "
    );
}

#[test]
fn test_casts() {
    let data = Data::new()
        .with("intVal", 2)
        .with("doubleVal", 2.0)
        .with("num", 42.5);
    assert_eq!(render_run("{intVal == doubleVal}", &data), "true");
    assert_eq!(render_run("{$asInt(intVal) == $asInt(doubleVal)}", &data), "true");
    assert_eq!(
        render_run(
            "{$asByte(num)},{$asShort(num)},{$asInt(num)},{$asLong(num)},{$asFloat(num)},{$asDouble(num)}",
            &data
        ),
        "42,42,42,42,42.5,42.5"
    );
}

#[test]
fn test_enumerate() {
    let data = Data::new().with("items", vec!["a", "b", "c"]);
    assert_eq!(
        render_run(
            "{for item in $enumerate(items)}{item.index}:{item.value}:{item.isFirst}:{item.isLast}:{item.isEven},{end}",
            &data
        ),
        "0:a:true:false:true,1:b:false:false:false,2:c:false:true:true,"
    );
}

#[test]
fn test_collection_builtins() {
    let data = Data::new()
        .with("items", vec![Some(1), None, Some(2), None, Some(3)])
        .with("fruits", vec!["apple", "banana", "cherry"])
        .with("nums", vec![1, 2, 3]);
    assert_eq!(
        render_run("{for item in $filterNotNull(items)}{item},{end}", &data),
        "1,2,3,"
    );
    assert_eq!(render_run(r#"{$join(fruits, ", ")}"#, &data), "apple, banana, cherry");
    assert_eq!(render_run("{for i in $range(1, 4)}{i},{end}", &data), "1,2,3,");
    assert_eq!(render_run("{for i in $reverse(nums)}{i},{end}", &data), "3,2,1,");
    assert_eq!(render_run("{nums | $map(x -> x * 10) | $sum()}", &data), "60.0");
}

#[test]
fn test_format_builtins() {
    let data = Data::new().with("num", 1234.5);
    assert_eq!(
        render_run(r##"{$formatNumber(num, "#,##0.00")}"##, &data),
        "1,234.50"
    );

    let date = render_run(r#"{$formatDate($now(), "yyyy-MM-dd")}"#, &Data::new());
    let shape: String = date
        .chars()
        .map(|c| if c.is_ascii_digit() { '9' } else { c })
        .collect();
    assert_eq!(shape, "9999-99-99");
}

#[test]
fn test_decimals_and_dates() {
    let data = Data::new()
        .with("price", BigDecimal::from_str("19.99").unwrap())
        .with("qty", 3)
        .with("due", NaiveDate::from_ymd_opt(2020, 8, 25).unwrap());
    assert_eq!(render_run("{price * qty}", &data), "59.97");
    assert_eq!(render_run("{due}", &data), "2020-08-25");
    assert_eq!(
        render_run(r#"{$formatDate(due, "EEEE, d MMMM yyyy")}"#, &data),
        "Tuesday, 25 August 2020"
    );
}

#[test]
fn test_optional_chaining() {
    let absent = Data::new().with("user", Value::Null);
    assert_eq!(render_run("Name: {user.?name}", &absent), "Name: ");

    let present = Data::new().with(
        "user",
        Value::map(ValueMap::from_iter([("name", Value::from("Alice"))])),
    );
    assert_eq!(render_run("Name: {user.?name}", &present), "Name: Alice");
}

#[test]
fn test_null_coalescing() {
    let text = r#"Name: {firstName ?? lastName ?? "Unknown"}"#;
    let none = Data::new()
        .with("firstName", Value::Null)
        .with("lastName", Value::Null);
    assert_eq!(render_run(text, &none), "Name: Unknown");

    let last = Data::new()
        .with("firstName", Value::Null)
        .with("lastName", "Smith");
    assert_eq!(render_run(text, &last), "Name: Smith");

    // Zero is a value, not an absence.
    assert_eq!(render_run("{count ?? 10}", &Data::new().with("count", 0)), "0");
}

#[test]
fn test_group_split_across_runs() {
    let xml = document("<w:p><w:r><w:t>Dear {na</w:t></w:r><w:r><w:t>me}, hi</w:t></w:r></w:p>");
    let out = crate::common::compile(&xml)
        .render(&Data::new().with("name", "Ada"))
        .unwrap();
    assert_eq!(
        out,
        document("<w:p><w:r><w:t>Dear Ada</w:t></w:r><w:r><w:t>, hi</w:t></w:r></w:p>")
    );
}

#[test]
fn test_var_and_do_accumulate_across_loop() {
    let data = Data::new().with("nums", vec![4, 5, 6]);
    assert_eq!(
        render_run("{var total = 0}{for n in nums}{do total = total + n}{end}{total}", &data),
        "15"
    );
}

#[derive(Debug)]
struct Invoice {
    number: String,
    total: f64,
    paid: bool,
}

#[test]
fn test_host_object_fields() {
    let invoice = Invoice {
        number: "INV-7".to_owned(),
        total: 99.5,
        paid: false,
    };
    let data = Data::new().with("invoice", Value::host(invoice)).with_type::<Invoice>(|t| {
        t.field("number", |i| Value::from(i.number.as_str()))
            .field("total", |i| Value::from(i.total))
            .field_mut(
                "paid",
                |i| Value::from(i.paid),
                |i, v| {
                    i.paid = v.is_truthy();
                    Ok(())
                },
            )
    });
    assert_eq!(
        render_run(
            "{invoice.number}: {invoice.total} {invoice.paid} {do invoice.paid = true}{invoice.paid}",
            &data
        ),
        "INV-7: 99.5 false true"
    );
}

#[test]
fn test_template_renders_repeatedly() {
    let template = crate::common::compile(&document(&paragraph("Hi {name}")));
    let first = template.render(&Data::new().with("name", "Ada")).unwrap();
    let second = template.render(&Data::new().with("name", "Grace")).unwrap();
    assert_eq!(first, document(&paragraph("Hi Ada")));
    assert_eq!(second, document(&paragraph("Hi Grace")));
}

#[test]
fn test_parallel_template_keeps_one_pool() {
    let template = compile_with(
        &document(&paragraph("{for x in xs}{x}{end}")),
        TemplateOptions::new()
            .with_parallel_loops(true)
            .with_worker_threads(2),
    );
    let copy = template.clone();
    let pool = template.pool().unwrap();
    assert_eq!(pool.threads(), 2);
    assert!(pool.ptr_eq(copy.pool().unwrap()));

    let data = Data::new().with("xs", vec![1, 2, 3]);
    for _ in 0..3 {
        assert_eq!(template.render(&data).unwrap(), document(&paragraph("123")));
    }
    assert!(crate::common::compile("x").pool().is_none());
}

struct Session(Arc<AtomicBool>);

impl Drop for Session {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[test]
fn test_render_with_closures_frees_data() {
    let closed = Arc::new(AtomicBool::new(false));
    let template = crate::common::compile(&document(&paragraph(
        "{var greet = n -> 'Hi ' + n}{for n in names}{greet(n)} {end}",
    )));
    let data = Data::new()
        .with("session", Value::host(Session(Arc::clone(&closed))))
        .with("names", vec!["Ada", "Grace"]);
    assert_eq!(
        template.render(&data).unwrap(),
        document(&paragraph("Hi Ada Hi Grace "))
    );
    drop(data);
    assert!(closed.load(Ordering::SeqCst));
}
