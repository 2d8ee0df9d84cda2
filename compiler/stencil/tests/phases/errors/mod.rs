//! Errors surfaced by compile and render.

use pretty_assertions::assert_eq;
use stencil::{Data, ErrorKind, FileTypeConfig, Template, TemplateOptions, Value};

use crate::common::{compile, document, paragraph, try_render};

fn compile_err(text: &str) -> stencil::TemplateError {
    Template::compile(
        &document(&paragraph(text)),
        &FileTypeConfig::docx(),
        TemplateOptions::default(),
    )
    .unwrap_err()
}

#[test]
fn test_missing_end_is_structural() {
    let err = compile_err("{for x in xs}{x}");
    assert_eq!(err.kind, ErrorKind::Structural);
    assert_eq!(err.message, "Missing 'end' for this 'for' group.");
    assert_eq!(err.lexeme, "for");
}

#[test]
fn test_stray_end_is_structural() {
    let err = compile_err("text{end}");
    assert_eq!(err.kind, ErrorKind::Structural);
    assert_eq!(err.message, "Found 'end' without a matching opening group.");
}

#[test]
fn test_unclosed_group_is_syntax() {
    let err = compile_err("{name");
    assert_eq!(err.kind, ErrorKind::Syntax);
    assert!(err.message.starts_with("Unclosed template group"));
}

#[test]
fn test_bad_expression_is_syntax() {
    assert_eq!(compile_err("{1 +}").kind, ErrorKind::Syntax);
}

#[test]
fn test_undefined_variable_points_into_document() {
    let xml = "<w:p>\n<w:r><w:t>Hi {nope}</w:t></w:r></w:p>";
    let err = try_render(xml, &Data::new()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert_eq!(err.lexeme, "nope");
    assert_eq!(&xml[err.span.to_range()], "nope");
    assert_eq!(
        err.describe(xml),
        "2:15: runtime error at 'nope': Undefined variable 'nope'."
    );
}

#[test]
fn test_runtime_error_in_loop_body() {
    let xml = document(&paragraph("{for n in nums}{10 / n},{end}"));
    let data = Data::new().with("nums", vec![5, 0]);
    let err = compile(&xml).render(&data).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert_eq!(err.lexeme, "/");
    assert!(!err.is_fatal());
}

#[test]
fn test_iterating_a_scalar_fails() {
    let xml = document(&paragraph("{for n in count}{n}{end}"));
    let err = compile(&xml)
        .render(&Data::new().with("count", Value::Int(3)))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Runtime);
    assert_eq!(err.lexeme, "n");
}

#[test]
fn test_errors_do_not_poison_the_template() {
    let template = compile(&document(&paragraph("{a.b}")));
    assert!(template.render(&Data::new().with("a", 1)).is_err());
    let ok = Data::new().with(
        "a",
        Value::map(stencil::ValueMap::from_iter([("b", Value::from("fine"))])),
    );
    assert_eq!(template.render(&ok).unwrap(), document(&paragraph("fine")));
}
