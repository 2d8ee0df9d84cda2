//! Shared helpers for the phase tests.

use stencil::{Data, FileTypeConfig, Template, TemplateError, TemplateOptions};

/// Wrap body content in a minimal `w:document`.
pub fn document(body: &str) -> String {
    format!("<w:document><w:body>{body}</w:body></w:document>")
}

/// One paragraph holding one run of text.
pub fn paragraph(text: &str) -> String {
    format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
}

pub fn compile(xml: &str) -> Template {
    compile_with(xml, TemplateOptions::default())
}

pub fn compile_with(xml: &str, options: TemplateOptions) -> Template {
    Template::compile(xml, &FileTypeConfig::docx(), options).unwrap()
}

pub fn try_render(xml: &str, data: &Data) -> Result<String, TemplateError> {
    Template::compile(xml, &FileTypeConfig::docx(), TemplateOptions::default())?.render(data)
}

/// Render a single paragraph of template text and return the document.
pub fn render_text(text: &str, data: &Data) -> String {
    compile(&document(&paragraph(text))).render(data).unwrap()
}

/// Render a single paragraph and return only the text of its run.
pub fn render_run(text: &str, data: &Data) -> String {
    let out = render_text(text, data);
    let start = out.find("<w:t>").map(|i| i + "<w:t>".len()).unwrap();
    let end = out.rfind("</w:t>").unwrap();
    out[start..end].to_owned()
}
