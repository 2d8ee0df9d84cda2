//! Interpreter output tokens and their serialization.

use crate::XmlRawToken;

/// One piece of rendered output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlOutputToken {
    /// Text produced by the template. When `escape` is set the text is XML
    /// escaped on serialization; otherwise it is emitted as-is.
    Content { text: String, escape: bool },
    /// A token copied from the source document.
    Raw(XmlRawToken),
    /// Splice point; serializes to nothing.
    Sentinel,
}

impl XmlOutputToken {
    /// Escaped text output.
    pub fn text(text: impl Into<String>) -> Self {
        XmlOutputToken::Content {
            text: text.into(),
            escape: true,
        }
    }

    /// Unescaped XML output.
    pub fn raw_xml(xml: impl Into<String>) -> Self {
        XmlOutputToken::Content {
            text: xml.into(),
            escape: false,
        }
    }

    /// Append this token's XML to `out`.
    pub fn write_xml(&self, out: &mut String) {
        match self {
            XmlOutputToken::Content { text, escape: true } => escape_into(text, out),
            XmlOutputToken::Content {
                text,
                escape: false,
            } => out.push_str(text),
            XmlOutputToken::Raw(raw) => out.push_str(raw.xml()),
            XmlOutputToken::Sentinel => {}
        }
    }

    /// This token's XML as a new string.
    pub fn xml_string(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }
}

/// Concatenate the XML of every token.
pub fn serialize(tokens: &[XmlOutputToken]) -> String {
    let mut out = String::with_capacity(tokens.len() * 16);
    for token in tokens {
        token.write_xml(&mut out);
    }
    out
}

/// Escape `& < > " '` for use in XML text or attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(text, &mut out);
    out
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
}
