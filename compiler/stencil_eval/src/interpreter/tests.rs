use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use rustc_hash::FxHashSet;
use stencil_diagnostic::{ErrorKind, TemplateError};
use stencil_ir::{serialize, Program, Stmt, XmlOutputToken};
use stencil_lexer::Delimiters;
use stencil_xml::{extract_groups, tokenize, Expander, TagNicknames};

use crate::rewriter::{FnRewriter, RawXmlRewriter};
use crate::value::{AccessorRegistry, Arity, Value, ValueMap};
use crate::{render_program, RenderOptions, RenderPool, RewriteError};

fn compile(template: &str) -> Program {
    let raw = tokenize(template, &[]).unwrap();
    let mut doc = extract_groups(raw, &Delimiters::default(), &TagNicknames::new()).unwrap();
    let tokens = Expander::new(Vec::new())
        .expand(doc.tokens, &mut doc.groups)
        .unwrap();
    stencil_parse::parse(&tokens, &doc.groups).unwrap()
}

fn try_render_with(
    template: &str,
    data: &ValueMap,
    options: &RenderOptions,
) -> Result<String, TemplateError> {
    let program = compile(template);
    let tokens = render_program(&program, data, &AccessorRegistry::new(), options, None)?;
    Ok(serialize(&tokens))
}

fn render_with(template: &str, data: &ValueMap) -> String {
    try_render_with(template, data, &RenderOptions::default()).unwrap()
}

fn render(template: &str) -> String {
    render_with(template, &ValueMap::new())
}

fn render_err(template: &str, data: &ValueMap) -> TemplateError {
    try_render_with(template, data, &RenderOptions::default()).unwrap_err()
}

fn people() -> ValueMap {
    let person = |name: &str, age: i32| {
        Value::map(ValueMap::from_iter([
            ("name", Value::from(name)),
            ("age", Value::Int(age)),
        ]))
    };
    ValueMap::from_iter([(
        "people",
        Value::list(vec![person("Ada", 36), person("Grace", 45), person("Linus", 28)]),
    )])
}

// Expressions

#[test]
fn test_interpolation_escapes_output() {
    let data = ValueMap::from_iter([("name", Value::from("Tom & Jerry"))]);
    assert_eq!(render_with("Hello {name}!", &data), "Hello Tom &amp; Jerry!");
}

#[test]
fn test_null_renders_empty() {
    let data = ValueMap::from_iter([("missing", Value::Null)]);
    assert_eq!(render_with("[{missing}]", &data), "[]");
}

#[test]
fn test_arithmetic_and_literals() {
    assert_eq!(render("{1 + 2 * 3}"), "7");
    assert_eq!(render("{2.5 * 2}"), "5.0");
    assert_eq!(render("{10.5m + 5}"), "15.5");
    assert_eq!(render("{-(3)}"), "-3");
    assert_eq!(render("{'a' + 1}"), "a1");
}

#[test]
fn test_logical_operators_return_deciding_operand() {
    assert_eq!(render("{null or 'fallback'}"), "fallback");
    assert_eq!(render("{'first' or 'second'}"), "first");
    assert_eq!(render("{0 and 'never'}"), "0");
    assert_eq!(render("{not 0}"), "true");
}

#[test]
fn test_null_coalesce_keeps_falsy_values() {
    assert_eq!(render("{null ?? 'x'}"), "x");
    assert_eq!(render("{0 ?? 'x'}"), "0");
    assert_eq!(render("{'' ?? 'x'}"), "");
}

#[test]
fn test_case_expression() {
    let template = "{case when n > 10 then 'high' when n > 5 then 'mid' else 'low' end}";
    let with = |n: i32| render_with(template, &ValueMap::from_iter([("n", Value::Int(n))]));
    assert_eq!(with(11), "high");
    assert_eq!(with(6), "mid");
    assert_eq!(with(1), "low");
    assert_eq!(render("[{case when false then 1 end}]"), "[]");
}

#[test]
fn test_property_access() {
    let data = people();
    assert_eq!(render_with("{people.first.name}", &data), "Ada");
    assert_eq!(render_with("{people.size}", &data), "3");
    assert_eq!(render_with("{people.first.nickname}", &data), "");

    let data = ValueMap::from_iter([("user", Value::Null)]);
    assert_eq!(render_with("[{user.?name}]", &data), "[]");
    let err = render_err("{user.name}", &data);
    assert_eq!(err.message, "Cannot get property 'name' of null.");
    assert_eq!(err.lexeme, "name");
}

#[test]
fn test_lambdas_and_closures() {
    assert_eq!(render("{var add = (a, b) -> a + b}{add(2, 3)}"), "5");
    assert_eq!(render("{var k = x -> y -> x * y}{k(3)(4)}"), "12");
}

#[test]
fn test_closure_captures_loop_variable() {
    let data = ValueMap::from_iter([("xs", Value::from(vec![1, 2]))]);
    assert_eq!(
        render_with("{for x in xs}{var f = y -> x + y}{f(10)};{end}", &data),
        "11;12;"
    );
}

#[test]
fn test_pipes() {
    let data = people();
    assert_eq!(
        render_with("{people | $map(p -> p.name) | $join(', ')}", &data),
        "Ada, Grace, Linus"
    );
    assert_eq!(render("{var twice = x -> x * 2}{21 | twice}"), "42");
    assert_eq!(render("{[3, 1] | $reverse}"), "[1, 3]");
}

#[test]
fn test_pipe_errors_bind_to_operator() {
    let err = render_err("{1 | 2}", &ValueMap::new());
    assert_eq!(err.message, "Right side of pipe must be callable.");
    assert_eq!(err.lexeme, "|");

    let err = render_err("{var f = () -> 1}{1 | f}", &ValueMap::new());
    assert_eq!(
        err.message,
        "Pipe operator requires function with at least 1 parameter, got 0."
    );

    let err = render_err("{1 | $join(',', 'x')}", &ValueMap::new());
    assert_eq!(err.message, "Expected 2 arguments but got 3.");
}

#[test]
fn test_call_errors() {
    let err = render_err("{var f = x -> x}{f(1, 2)}", &ValueMap::new());
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert_eq!(err.message, "Expected 1 arguments but got 2.");
    assert_eq!(err.lexeme, ")");

    let err = render_err("{$reduce([1])}", &ValueMap::new());
    assert_eq!(err.message, "Expected 2 to 3 arguments but got 1.");

    let err = render_err("{'text'()}", &ValueMap::new());
    assert_eq!(err.message, "Can only call functions.");
}

#[test]
fn test_native_errors_bind_to_call_site() {
    let err = render_err("{$asInt('abc')}", &ValueMap::new());
    assert_eq!(err.message, "$asInt: cannot convert 'abc' to int.");
    assert_eq!(err.lexeme, ")");
}

#[test]
fn test_errors_inside_callbacks_keep_their_location() {
    let err = render_err("{$map([1, 0], x -> 10 / x)}", &ValueMap::new());
    assert_eq!(err.message, "Division by zero.");
    assert_eq!(err.lexeme, "/");
}

#[test]
fn test_undefined_variable() {
    let err = render_err("ab{nope}", &ValueMap::new());
    assert_eq!(err.message, "Undefined variable 'nope'.");
    assert_eq!(err.span.to_range(), 3..7);
}

#[test]
fn test_data_keys_shadow_builtins() {
    let data = ValueMap::from_iter([("$sum", Value::from("mine"))]);
    assert_eq!(render_with("{$sum}", &data), "mine");
}

// Statements

#[test]
fn test_for_loop_over_list() {
    let data = people();
    assert_eq!(
        render_with("{for p in people}{p.name} ({p.age}); {end}", &data),
        "Ada (36); Grace (45); Linus (28); "
    );
}

#[test]
fn test_for_loop_over_map_entries() {
    let data = ValueMap::from_iter([(
        "scores",
        Value::map(ValueMap::from_iter([("b", Value::Int(2)), ("a", Value::Int(1))])),
    )]);
    assert_eq!(
        render_with("{for e in scores}{e.key}={e.value} {end}", &data),
        "b=2 a=1 "
    );
}

#[test]
fn test_for_loop_rejects_scalars() {
    let err = render_err("{for x in 5}{x}{end}", &ValueMap::new());
    assert_eq!(err.message, "'for' loop expression cannot be iterated over: int.");
    assert_eq!(err.lexeme, "x");
}

#[test]
fn test_if_blocks() {
    let template = "{if show}shown{end}|";
    let with = |v: Value| render_with(template, &ValueMap::from_iter([("show", v)]));
    assert_eq!(with(Value::Bool(true)), "shown|");
    assert_eq!(with(Value::from("")), "|");
    assert_eq!(with(Value::list(vec![])), "|");
    assert_eq!(with(Value::Int(0)), "|");
}

#[test]
fn test_var_and_do_accumulate() {
    let data = ValueMap::from_iter([("xs", Value::from(vec![1, 2, 3]))]);
    assert_eq!(
        render_with("{var total = 0}{for x in xs}{do total = total + x}{end}{total}", &data),
        "6"
    );
    assert_eq!(render("[{var empty}{empty}]"), "[]");
}

#[test]
fn test_loop_scopes_do_not_leak() {
    let data = ValueMap::from_iter([("xs", Value::from(vec![1, 2]))]);
    assert_eq!(
        render_with("{for x in xs}{var seen = x}{seen}{end}", &data),
        "12"
    );
    let err = render_err("{for x in xs}{end}{x}", &data);
    assert_eq!(err.message, "Undefined variable 'x'.");
}

#[test]
fn test_map_mutation_is_visible_to_data() {
    let row = Value::map(ValueMap::from_iter([("total", Value::Int(0))]));
    let data = ValueMap::from_iter([("row", row.clone())]);
    assert_eq!(render_with("{do row.total = 5}{row.total}", &data), "5");
    let Value::Map(map) = row else {
        panic!("expected a map");
    };
    assert_eq!(map.get("total"), Some(Value::Int(5)));
}

#[test]
fn test_insert_with_null_target_passes_body_through() {
    assert_eq!(render("{insert null}body{end}"), "body");
}

#[test]
fn test_insert_raw_xml_replaces_body() {
    let data = ValueMap::from_iter([("chart", Value::from("<w:drawing/>"))]);
    assert_eq!(
        render_with("a{insert $rawXml(chart)}placeholder{end}b", &data),
        "a<w:drawing/>b"
    );
    assert_eq!(render("a{insert $rawXml(null)}x{end}b"), "ab");
}

#[test]
fn test_rewrite_with_identity_and_custom_rewriter() {
    assert_eq!(render("{rewrite $identity()}kept{end}"), "kept");

    let upper = Value::rewriter(FnRewriter(
        |tokens: Vec<XmlOutputToken>| -> Result<Vec<XmlOutputToken>, RewriteError> {
            Ok(tokens
                .into_iter()
                .map(|t| XmlOutputToken::raw_xml(t.xml_string().to_uppercase()))
                .collect())
        },
    ));
    let data = ValueMap::from_iter([("upper", upper), ("who", Value::from("bob"))]);
    assert_eq!(render_with("{rewrite upper}hi {who}{end}", &data), "HI BOB");
}

#[test]
fn test_rewriter_failures() {
    let err = render_err("{insert 'nope'}x{end}", &ValueMap::new());
    assert_eq!(err.message, "Need a stream rewriter for `insert` statement.");
    assert_eq!(err.lexeme, "insert");

    let failing = Value::rewriter(FnRewriter(
        |_: Vec<XmlOutputToken>| -> Result<Vec<XmlOutputToken>, RewriteError> {
            Err(RewriteError::new("cannot rewrite"))
        },
    ));
    let data = ValueMap::from_iter([("bad", failing)]);
    let err = render_err("{rewrite bad}x{end}", &data);
    assert_eq!(err.message, "cannot rewrite");
    assert_eq!(err.lexeme, "rewrite");

    let data = ValueMap::from_iter([("fixed", Value::rewriter(RawXmlRewriter::new("<x/>")))]);
    assert_eq!(render_with("{insert fixed}y{end}", &data), "<x/>");
}

#[test]
fn test_block_statement_scopes_its_bindings() {
    let Program { mut stmts, arena } = compile("{var x = 'outer'}{var x = 'inner'}{x}{x}");
    stmts.retain(|stmt| !matches!(stmt, Stmt::Verbatim(_)));
    assert_eq!(stmts.len(), 4);
    let last = stmts.split_off(3);
    let inner = stmts.split_off(1);
    stmts.push(Stmt::Block(inner));
    stmts.extend(last);
    let program = Program::new(stmts, arena);

    let tokens = render_program(
        &program,
        &ValueMap::new(),
        &AccessorRegistry::new(),
        &RenderOptions::default(),
        None,
    )
    .unwrap();
    assert_eq!(serialize(&tokens), "innerouter");
}

// Parallel loops

#[test]
fn test_parallel_loops_preserve_order() {
    let xs: Vec<i32> = (0..200).collect();
    let data = ValueMap::from_iter([("xs", Value::from(xs))]);
    let template = "{for x in xs}{for y in [1, 2]}{x * y},{end}{end}";
    let sequential = render_with(template, &data);
    let parallel = try_render_with(
        template,
        &data,
        &RenderOptions {
            parallel_loops: true,
            worker_threads: 4,
            ..RenderOptions::default()
        },
    )
    .unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn test_parallel_loop_error_surfaces() {
    let data = ValueMap::from_iter([("xs", Value::from(vec![1, 0, 2]))]);
    let options = RenderOptions {
        parallel_loops: true,
        worker_threads: 2,
        ..RenderOptions::default()
    };
    let err = try_render_with("{for x in xs}{1 / x}{end}", &data, &options).unwrap_err();
    assert_eq!(err.message, "Division by zero.");
}

#[test]
fn test_renders_reuse_one_pool() {
    let threads = Arc::new(Mutex::new(FxHashSet::default()));
    let seen = Arc::clone(&threads);
    let record_thread = Value::native("recordThread", Arity::Exact(1), move |_, _| {
        seen.lock().insert(std::thread::current().id());
        Ok(Value::Null)
    });
    let xs: Vec<i32> = (0..64).collect();
    let data = ValueMap::from_iter([("xs", Value::from(xs)), ("recordThread", record_thread)]);
    let options = RenderOptions {
        parallel_loops: true,
        worker_threads: 2,
        ..RenderOptions::default()
    };
    let pool = RenderPool::for_options(&options).unwrap();
    let program = compile("{for x in xs}{recordThread(x)}{end}");

    for _ in 0..4 {
        render_program(&program, &data, &AccessorRegistry::new(), &options, Some(&pool)).unwrap();
    }
    assert_eq!(pool.threads(), 2);
    // Loop bodies only ever ran on the two shared workers.
    assert!(threads.lock().len() <= 2);
}

#[test]
fn test_sequential_options_ignore_pool() {
    let pool = RenderPool::new(2).unwrap();
    assert!(RenderPool::for_options(&RenderOptions::default()).is_none());
    let data = ValueMap::from_iter([("xs", Value::from(vec![1, 2, 3]))]);
    let program = compile("{for x in xs}{x}{end}");
    let tokens = render_program(
        &program,
        &data,
        &AccessorRegistry::new(),
        &RenderOptions::default(),
        Some(&pool),
    )
    .unwrap();
    assert_eq!(serialize(&tokens), "123");
}

// Scope release

/// Host value that reports when the last copy is dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

/// Render `template` with a `DropFlag` bound as `ctx`, drop the data and
/// report whether the flag was dropped with it.
fn context_released_after(template: &str) -> bool {
    let dropped = Arc::new(AtomicBool::new(false));
    let data = ValueMap::from_iter([("ctx", Value::host(DropFlag(Arc::clone(&dropped))))]);
    let program = compile(template);
    let result = render_program(
        &program,
        &data,
        &AccessorRegistry::new(),
        &RenderOptions::default(),
        None,
    );
    drop(result);
    drop(data);
    dropped.load(Ordering::SeqCst)
}

#[test]
fn test_closure_in_global_scope_is_released() {
    assert!(context_released_after("{var f = x -> x}ok"));
    assert!(context_released_after("{var f = x -> ctx}{var g = f}ok"));
}

#[test]
fn test_closure_in_loop_scope_is_released() {
    assert!(context_released_after(
        "{for i in [1, 2]}{var g = y -> i + y}{g(1)}{end}"
    ));
}

#[test]
fn test_curried_closure_is_released() {
    assert!(context_released_after(
        "{var k = x -> y -> x * y}{var triple = k(3)}{triple(2)}"
    ));
}

#[test]
fn test_closure_is_released_after_failed_render() {
    assert!(context_released_after("{var f = x -> x}{1 / 0}"));
}

#[test]
fn test_render_without_closures_releases_context() {
    assert!(context_released_after("{ctx}"));
}
