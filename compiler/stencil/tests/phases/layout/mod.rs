//! Group relocation, raw XML insertion and repair, seen in rendered output.

use pretty_assertions::assert_eq;
use stencil::{Data, FileTypeConfig, Template, TemplateOptions, Value, ValueMap, XmlOutputToken};

use crate::common::{compile, compile_with, document, paragraph};

fn cell(text: &str) -> String {
    format!("<w:tc>{}</w:tc>", paragraph(text))
}

fn row_table() -> String {
    document(&format!(
        "<w:tbl><w:tr>{}{}</w:tr></w:tbl>",
        cell("{for r in rows}{r.name}"),
        cell("{r.qty}{end}")
    ))
}

fn rows(items: &[(&str, i32)]) -> Data {
    let rows: Vec<Value> = items
        .iter()
        .map(|(name, qty)| {
            Value::map(ValueMap::from_iter([
                ("name", Value::from(*name)),
                ("qty", Value::Int(*qty)),
            ]))
        })
        .collect();
    Data::new().with("rows", Value::list(rows))
}

#[test]
fn test_loop_across_cells_repeats_the_row() {
    let out = compile(&row_table())
        .render(&rows(&[("Bolts", 10), ("Nuts", 4)]))
        .unwrap();
    let expected = document(&format!(
        "<w:tbl><w:tr>{}{}</w:tr><w:tr>{}{}</w:tr></w:tbl>",
        cell("Bolts"),
        cell("10"),
        cell("Nuts"),
        cell("4")
    ));
    assert_eq!(out, expected);
}

#[test]
fn test_empty_table_is_removed_by_repair() {
    let template = compile(&row_table());
    assert_eq!(template.render(&rows(&[])).unwrap(), document(""));

    let unrepaired = compile_with(&row_table(), TemplateOptions::default().with_repair(false));
    assert_eq!(
        unrepaired.render(&rows(&[])).unwrap(),
        document("<w:tbl></w:tbl>")
    );
}

#[test]
fn test_empty_cell_gets_a_paragraph() {
    let xml = document(&format!(
        "<w:tbl><w:tr>{}</w:tr></w:tbl>",
        cell("{for x in xs @block}{x}{end}")
    ));
    let data = Data::new().with("xs", Value::list(vec![]));
    assert_eq!(
        compile(&xml).render(&data).unwrap(),
        document("<w:tbl><w:tr><w:tc><w:p></w:p></w:tc></w:tr></w:tbl>")
    );
}

#[test]
fn test_conditional_paragraph() {
    let xml = document(&format!(
        "{}{}",
        paragraph("{if show @block}Secret{end}"),
        paragraph("Visible")
    ));
    let template = compile(&xml);
    assert_eq!(
        template.render(&Data::new().with("show", false)).unwrap(),
        document(&paragraph("Visible"))
    );
    assert_eq!(
        template.render(&Data::new().with("show", true)).unwrap(),
        document(&format!("{}{}", paragraph("Secret"), paragraph("Visible")))
    );
}

#[test]
fn test_raw_xml_replaces_its_paragraph() {
    let xml = document(&format!(
        "{}{}",
        paragraph("{insert $rawXml(chart)}{end}"),
        paragraph("after")
    ));
    let data = Data::new().with("chart", "<w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>");
    assert_eq!(
        compile(&xml).render(&data).unwrap(),
        document(&format!(
            "<w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>{}",
            paragraph("after")
        ))
    );
}

#[test]
fn test_render_tokens_keep_raw_xml_unescaped() {
    let xml = document(&paragraph("{insert $rawXml(frag)}{end}"));
    let data = Data::new().with("frag", "<w:p>&amp;</w:p>");
    let tokens = compile(&xml).render_tokens(&data).unwrap();
    assert!(tokens.contains(&XmlOutputToken::raw_xml("<w:p>&amp;</w:p>")));
}

#[test]
fn test_line_breaks_become_break_elements() {
    let xml = document(&paragraph(
        "Ship to: {rewrite $lineBreaksToTags()}{address}{end}",
    ));
    let data = Data::new().with("address", "1 Main St\nSpringfield & Co");
    assert_eq!(
        compile(&xml).render(&data).unwrap(),
        document(&paragraph(
            "Ship to: 1 Main St</w:t><w:br/><w:t>Springfield &amp; Co"
        ))
    );
}

#[test]
fn test_line_breaks_need_a_configured_element() {
    let xml = document(&paragraph("{rewrite $lineBreaksToTags()}{address}{end}"));
    let config = FileTypeConfig::new().with_text_tags(["w:t"]);
    let template = Template::compile(&xml, &config, TemplateOptions::default()).unwrap();
    let err = template
        .render(&Data::new().with("address", "a\nb"))
        .unwrap_err();
    assert!(err.message.contains("no line-break element"));
}

#[test]
fn test_custom_delimiters() {
    let options = TemplateOptions::default().with_delimiters("[[", "]]");
    let template = compile_with(&document(&paragraph("Hi [[name]], {not a group}")), options);
    assert_eq!(
        template.render(&Data::new().with("name", "Ada")).unwrap(),
        document(&paragraph("Hi Ada, {not a group}"))
    );
}

#[test]
fn test_markup_without_groups_is_untouched() {
    let xml = concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>",
        "<w:document xmlns:w=\"urn:w\"><w:body>",
        "<w:p w:rsidR=\"00A1\"><w:r><w:rPr><w:b/></w:rPr><w:t xml:space=\"preserve\"> a &amp; b </w:t></w:r></w:p>",
        "</w:body></w:document>"
    );
    assert_eq!(compile(xml).render(&Data::new()).unwrap(), xml);
}
