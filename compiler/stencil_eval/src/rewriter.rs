//! Stream rewriters for `insert` and `rewrite` blocks.
//!
//! A rewriter receives the rendered output of its block body (after the
//! block has been expanded to its target element) and returns the tokens
//! that replace it.

use std::fmt;

use stencil_ir::XmlOutputToken;
use tracing::trace;

use crate::RewriteError;

pub trait XmlStreamRewriter: Send + Sync {
    fn rewrite(&self, tokens: Vec<XmlOutputToken>) -> Result<Vec<XmlOutputToken>, RewriteError>;
}

/// Passes the body through unchanged.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityRewriter;

impl XmlStreamRewriter for IdentityRewriter {
    fn rewrite(&self, tokens: Vec<XmlOutputToken>) -> Result<Vec<XmlOutputToken>, RewriteError> {
        Ok(tokens)
    }
}

/// Replaces the whole body with a fixed XML fragment, emitted unescaped.
#[derive(Clone, Debug)]
pub struct RawXmlRewriter {
    xml: String,
}

impl RawXmlRewriter {
    pub fn new(xml: impl Into<String>) -> Self {
        RawXmlRewriter { xml: xml.into() }
    }
}

impl XmlStreamRewriter for RawXmlRewriter {
    fn rewrite(&self, tokens: Vec<XmlOutputToken>) -> Result<Vec<XmlOutputToken>, RewriteError> {
        trace!(replaced = tokens.len(), "raw xml rewrite");
        if self.xml.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![XmlOutputToken::raw_xml(self.xml.clone())])
    }
}

/// How a file type spells a manual line break.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineBreaks {
    /// Empty element emitted for each break, e.g. `w:br`.
    pub tag: String,
    /// Elements that must be closed around the break and reopened after
    /// it, outermost first, e.g. `w:t`.
    pub enclosing_tags: Vec<String>,
}

impl LineBreaks {
    pub fn new<I, S>(tag: impl Into<String>, enclosing_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LineBreaks {
            tag: tag.into(),
            enclosing_tags: enclosing_tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Markup that replaces one `\n`: `</w:t><w:br/><w:t>` for WordprocessingML.
    pub fn markup(&self) -> String {
        let mut xml = String::new();
        for tag in self.enclosing_tags.iter().rev() {
            xml.push_str("</");
            xml.push_str(tag);
            xml.push('>');
        }
        xml.push('<');
        xml.push_str(&self.tag);
        xml.push_str("/>");
        for tag in &self.enclosing_tags {
            xml.push('<');
            xml.push_str(tag);
            xml.push('>');
        }
        xml
    }
}

/// Turns newlines in rendered text into line-break elements.
///
/// Only escaped text is split; markup copied from the document and raw XML
/// pass through untouched. `\r\n` counts as one break.
#[derive(Clone, Debug)]
pub struct LineBreakRewriter {
    markup: String,
}

impl LineBreakRewriter {
    pub fn new(line_breaks: &LineBreaks) -> Self {
        LineBreakRewriter {
            markup: line_breaks.markup(),
        }
    }
}

impl XmlStreamRewriter for LineBreakRewriter {
    fn rewrite(&self, tokens: Vec<XmlOutputToken>) -> Result<Vec<XmlOutputToken>, RewriteError> {
        let mut out = Vec::with_capacity(tokens.len());
        for token in tokens {
            match token {
                XmlOutputToken::Content { text, escape: true } if text.contains('\n') => {
                    for (i, line) in text.split('\n').enumerate() {
                        if i > 0 {
                            out.push(XmlOutputToken::raw_xml(self.markup.as_str()));
                        }
                        let line = line.strip_suffix('\r').unwrap_or(line);
                        if !line.is_empty() {
                            out.push(XmlOutputToken::text(line));
                        }
                    }
                }
                other => out.push(other),
            }
        }
        Ok(out)
    }
}

/// Adapter so any closure can act as a rewriter.
pub struct FnRewriter<F>(pub F);

impl<F> XmlStreamRewriter for FnRewriter<F>
where
    F: Fn(Vec<XmlOutputToken>) -> Result<Vec<XmlOutputToken>, RewriteError> + Send + Sync,
{
    fn rewrite(&self, tokens: Vec<XmlOutputToken>) -> Result<Vec<XmlOutputToken>, RewriteError> {
        (self.0)(tokens)
    }
}

impl<F> fmt::Debug for FnRewriter<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnRewriter")
    }
}
