use pretty_assertions::assert_eq;
use stencil_ir::{
    ExpansionDirection, ExpansionTarget, GroupKind, Span, TagPartType, TokenKind, XmlInputToken,
    XmlRawToken,
};
use stencil_lexer::Delimiters;

use super::*;

fn text_tags() -> Vec<String> {
    vec!["w:t".to_owned()]
}

fn nicknames() -> TagNicknames {
    TagNicknames::new().with("inline", "w:r").with("block", "w:p")
}

fn extract(xml: &str) -> ExtractedDocument {
    let raw = tokenize(xml, &text_tags()).unwrap();
    extract_groups(raw, &Delimiters::default(), &nicknames()).unwrap()
}

fn extract_err(xml: &str) -> XmlError {
    let raw = tokenize(xml, &text_tags()).unwrap();
    extract_groups(raw, &Delimiters::default(), &nicknames()).unwrap_err()
}

/// Document XML with each group replaced by its source text in brackets.
fn rebuild(doc: &ExtractedDocument) -> String {
    doc.tokens
        .iter()
        .map(|t| match t {
            XmlInputToken::Raw(raw) => raw.xml().to_owned(),
            XmlInputToken::Group(id) => {
                let group = doc.groups.get(*id);
                let inner: Vec<&str> = group.tokens.iter().map(|t| t.lexeme.as_str()).collect();
                format!("[{}]", inner.join(" "))
            }
            XmlInputToken::Sentinel => String::new(),
        })
        .collect()
}

// Tokenizer

#[test]
fn test_tokenize_round_trips() {
    let xml = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
        "<!-- note -->",
        "<w:document xmlns:w=\"urn:w\"><w:body>",
        "<w:p w:rsidR=\"00A1\"><w:r><w:t xml:space=\"preserve\">a &amp; b</w:t></w:r>",
        "<w:r><w:br/></w:r></w:p>",
        "<![CDATA[<raw>]]>",
        "</w:body></w:document>"
    );
    let tokens = tokenize(xml, &text_tags()).unwrap();
    let rebuilt: String = tokens.iter().map(XmlRawToken::xml).collect();
    assert_eq!(rebuilt, xml);
}

#[test]
fn test_tokenize_tag_parts() {
    let tokens = tokenize("<w:p a=\"x>y\"><w:t>hi</w:t><w:br/></w:p>", &text_tags()).unwrap();
    let parts: Vec<_> = tokens
        .iter()
        .filter_map(|t| t.tag().map(|(name, part)| (name.to_owned(), part)))
        .collect();
    assert_eq!(
        parts,
        vec![
            ("w:p".to_owned(), TagPartType::Opening),
            ("w:t".to_owned(), TagPartType::Opening),
            ("w:t".to_owned(), TagPartType::Closing),
            ("w:br".to_owned(), TagPartType::SelfClosing),
            ("w:p".to_owned(), TagPartType::Closing),
        ]
    );
    assert_eq!(
        tokens[2],
        XmlRawToken::Content {
            offset: 18,
            text: "hi".to_owned(),
            inside_text_tag: true,
        }
    );
}

#[test]
fn test_tokenize_marks_text_tags() {
    let tokens = tokenize("<w:p>x<w:t>y</w:t></w:p>", &text_tags()).unwrap();
    let flags: Vec<bool> = tokens
        .iter()
        .filter_map(|t| match t {
            XmlRawToken::Content {
                inside_text_tag, ..
            } => Some(*inside_text_tag),
            _ => None,
        })
        .collect();
    assert_eq!(flags, vec![false, true]);
}

#[test]
fn test_tokenize_unterminated_tag() {
    let err = tokenize("<w:p><w:t", &text_tags()).unwrap_err();
    assert!(matches!(err, XmlError::Malformed { .. }));
    assert_eq!(err.message(), "Unterminated markup.");
    let err = tokenize("<!-- open", &text_tags()).unwrap_err();
    assert_eq!(err.message(), "Unterminated markup.");
}

// Extraction

#[test]
fn test_extract_single_group() {
    let doc = extract("<w:t>Hello {name}!</w:t>");
    assert_eq!(rebuild(&doc), "<w:t>Hello [{ name }]!</w:t>");
    assert_eq!(doc.groups.len(), 1);
    let group = doc.groups.get(stencil_ir::GroupId::new(0));
    assert_eq!(group.kind, GroupKind::Placeholder);
    assert_eq!(group.span, Span::new(11, 17));
}

#[test]
fn test_extract_fragment_without_text_tags() {
    let doc = extract("{for p in people}{p.name}, {end}");
    assert_eq!(
        rebuild(&doc),
        "[{ for p in people }][{ p . name }], [{ end }]"
    );
}

#[test]
fn test_extract_ignores_non_text_content() {
    let doc = extract("<w:p>{x}<w:t>{y}</w:t></w:p>");
    assert_eq!(rebuild(&doc), "<w:p>{x}<w:t>[{ y }]</w:t></w:p>");
}

#[test]
fn test_extract_group_split_across_runs() {
    let xml = "<w:p><w:r><w:t>Dear {na</w:t></w:r><w:r><w:t>me}, hi</w:t></w:r></w:p>";
    let doc = extract(xml);
    assert_eq!(
        rebuild(&doc),
        "<w:p><w:r><w:t>Dear [{ name }]</w:t></w:r><w:r><w:t>, hi</w:t></w:r></w:p>"
    );
    let group = doc.groups.get(stencil_ir::GroupId::new(0));
    // `na` sits at 21..23 and `me` at 45..47 in the document.
    assert_eq!(group.tokens[1].lexeme, "name");
    assert_eq!(group.tokens[1].span, Span::new(21, 47));
}

#[test]
fn test_extract_unescapes_entities() {
    let doc = extract("<w:t>{a &gt; 1 and b &lt; 2 ?? &quot;x&quot;}</w:t>");
    let group = doc.groups.get(stencil_ir::GroupId::new(0));
    let kinds: Vec<TokenKind> = group.tokens.iter().map(|t| t.kind).collect();
    assert_eq!(kinds[2], TokenKind::Greater);
    assert_eq!(group.tokens[group.tokens.len() - 2].lexeme, "\"x\"");
}

#[test]
fn test_extract_skips_delimiters_in_strings() {
    let doc = extract("<w:t>{\"}\" + 'a}'}</w:t>");
    assert_eq!(doc.groups.len(), 1);
    let group = doc.groups.get(stencil_ir::GroupId::new(0));
    assert_eq!(group.tokens.len(), 5);
}

#[test]
fn test_extract_custom_delimiters() {
    let raw = tokenize("<w:t>a [[x]] b</w:t>", &text_tags()).unwrap();
    let doc = extract_groups(raw, &Delimiters::new("[[", "]]"), &nicknames()).unwrap();
    assert_eq!(rebuild(&doc), "<w:t>a [[[ x ]]] b</w:t>");
}

#[test]
fn test_extract_unclosed_group() {
    let err = extract_err("<w:t>Hello {name</w:t>");
    assert!(matches!(err, XmlError::Malformed { .. }));
    assert_eq!(err.message(), "Unclosed template group, expected '}'.");
}

#[test]
fn test_extract_reports_scan_errors() {
    let err = extract_err("<w:t>{a # b}</w:t>");
    assert!(matches!(err, XmlError::Lex(_)));
}

// Classification

#[test]
fn test_classify_kinds() {
    let doc = extract("{for x in xs}{if x}{x}{end}{do y = 1}{var z = 2}{insert $identity}{end}{rewrite $identity}{end}{end}");
    let kinds: Vec<GroupKind> = doc.groups.iter().map(|(_, g)| g.kind).collect();
    assert_eq!(
        kinds,
        vec![
            GroupKind::For,
            GroupKind::If,
            GroupKind::Placeholder,
            GroupKind::End,
            GroupKind::Do,
            GroupKind::Placeholder,
            GroupKind::Insert,
            GroupKind::End,
            GroupKind::Rewrite,
            GroupKind::End,
            GroupKind::End,
        ]
    );
}

#[test]
fn test_classify_expansion_settings() {
    let doc = extract("{for x in xs @inline}{end}{do y = 1}{y}");
    let settings: Vec<_> = doc
        .groups
        .iter()
        .map(|(_, g)| {
            (
                g.expansion_target.clone(),
                g.expansion_direction,
                g.requires_partner,
            )
        })
        .collect();
    assert_eq!(
        settings,
        vec![
            (ExpansionTarget::Tag("w:r".into()), ExpansionDirection::Left, true),
            (ExpansionTarget::Auto, ExpansionDirection::Right, true),
            (ExpansionTarget::Outermost, ExpansionDirection::Left, false),
            (ExpansionTarget::None, ExpansionDirection::Both, false),
        ]
    );
}

#[test]
fn test_classify_removes_annotation() {
    let doc = extract("{for row in rows @w:tr}");
    let group = doc.groups.get(stencil_ir::GroupId::new(0));
    assert!(group.tokens.iter().all(|t| t.kind != TokenKind::At));
    assert_eq!(group.tokens.len(), 6);
}

#[test]
fn test_classify_rejects_misplaced_annotations() {
    let err = extract_err("{name @w:p}");
    assert_eq!(
        err.message(),
        "Expansion targets may only annotate 'for', 'if', 'insert' or 'rewrite' groups."
    );
    let err = extract_err("{for x @w:p in xs}");
    assert_eq!(
        err.message(),
        "An expansion target must be the last element of its group."
    );
    let err = extract_err("{if x @w:p @w:r}");
    assert_eq!(err.message(), "A group may carry only one expansion target.");
}

// Whole pipeline

#[test]
fn test_pipeline_expands_row_loop() {
    let xml = concat!(
        "<w:tbl><w:tr><w:tc><w:p><w:r><w:t>{for r in rows}{r}</w:t></w:r></w:p></w:tc>",
        "<w:tc><w:p><w:r><w:t>{end}</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"
    );
    let mut doc = extract(xml);
    let expander = Expander::new(vec![ExpansionRule::new("w:tc", "w:tr").excluding("w:tbl")]);
    let tokens = expander.expand(doc.tokens, &mut doc.groups).unwrap();
    doc.tokens = tokens;
    assert_eq!(
        rebuild(&doc),
        concat!(
            "<w:tbl>[{ for r in rows }]<w:tr><w:tc><w:p><w:r><w:t>[{ r }]</w:t></w:r></w:p></w:tc>",
            "<w:tc><w:p><w:r><w:t></w:t></w:r></w:p></w:tc></w:tr>[{ end }]</w:tbl>"
        )
    );
}
