use pretty_assertions::assert_eq;
use stencil_ir::{Span, Token, TokenKind};

use super::*;

#[test]
fn test_line_table_lookup() {
    let source = "<w:p>\n<w:t>{x}</w:t>\n</w:p>";
    let table = LineOffsetTable::build(source);
    assert_eq!(table.line_count(), 3);
    assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
    assert_eq!(table.offset_to_line_col(source, 11), (2, 6));
    assert_eq!(table.offset_to_line_col(source, 21), (3, 1));
}

#[test]
fn test_error_display_names_kind_and_lexeme() {
    let token = Token::new(TokenKind::Slash, "/", Span::new(3, 4));
    let err = TemplateError::at_token(ErrorKind::Runtime, "Division by zero.", &token);
    assert_eq!(err.to_string(), "runtime error at '/': Division by zero.");
    assert!(!err.is_fatal());
}

#[test]
fn test_describe_prefixes_location() {
    let source = "ab\ncd{1/0}";
    let err = TemplateError::new(ErrorKind::Runtime, "Division by zero.", Span::new(7, 8), "/");
    assert_eq!(
        err.describe(source),
        "2:5: runtime error at '/': Division by zero."
    );
}
