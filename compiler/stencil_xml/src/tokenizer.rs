//! Lossless XML tokenizer.
//!
//! The document is only split, never normalized: every byte of the input
//! lands in exactly one token, so writing the tokens back out reproduces the
//! input. Attribute values are skipped with quote tracking so a `>` inside an
//! attribute does not end the tag.

use memchr::{memchr, memmem};
use stencil_ir::{Span, TagPartType, XmlRawToken};
use tracing::debug;

use crate::XmlError;

/// Split `xml` into raw tokens. Elements named in `text_tags` hold text
/// content that may carry template groups.
#[tracing::instrument(level = "debug", skip_all, fields(len = xml.len()))]
pub fn tokenize(xml: &str, text_tags: &[String]) -> Result<Vec<XmlRawToken>, XmlError> {
    let tokens = Tokenizer {
        xml,
        text_tags,
        pos: 0,
        text_depth: 0,
        tokens: Vec::new(),
    }
    .run()?;
    debug!(count = tokens.len(), "tokenized document");
    Ok(tokens)
}

struct Tokenizer<'a> {
    xml: &'a str,
    text_tags: &'a [String],
    pos: usize,
    /// Number of currently open text elements.
    text_depth: u32,
    tokens: Vec<XmlRawToken>,
}

impl Tokenizer<'_> {
    fn run(mut self) -> Result<Vec<XmlRawToken>, XmlError> {
        let bytes = self.xml.as_bytes();
        while self.pos < bytes.len() {
            match memchr(b'<', &bytes[self.pos..]) {
                Some(0) => self.markup()?,
                Some(n) => self.content(self.pos + n),
                None => self.content(bytes.len()),
            }
        }
        Ok(self.tokens)
    }

    fn content(&mut self, end: usize) {
        self.tokens.push(XmlRawToken::Content {
            offset: to_offset(self.pos),
            text: self.xml[self.pos..end].to_owned(),
            inside_text_tag: self.text_depth > 0,
        });
        self.pos = end;
    }

    fn markup(&mut self) -> Result<(), XmlError> {
        let rest = &self.xml[self.pos..];
        if rest.starts_with("<!--") {
            self.verbatim("-->")
        } else if rest.starts_with("<![CDATA[") {
            self.verbatim("]]>")
        } else if rest.starts_with("<?") {
            self.verbatim("?>")
        } else if rest.starts_with("<!") {
            self.verbatim(">")
        } else {
            self.tag()
        }
    }

    fn verbatim(&mut self, terminator: &str) -> Result<(), XmlError> {
        let rest = &self.xml.as_bytes()[self.pos..];
        let Some(found) = memmem::find(rest, terminator.as_bytes()) else {
            return Err(self.unterminated(self.xml.len()));
        };
        let end = self.pos + found + terminator.len();
        self.tokens.push(XmlRawToken::Verbatim {
            offset: to_offset(self.pos),
            text: self.xml[self.pos..end].to_owned(),
        });
        self.pos = end;
        Ok(())
    }

    fn tag(&mut self) -> Result<(), XmlError> {
        let bytes = self.xml.as_bytes();
        let start = self.pos;
        let mut i = start + 1;
        let closing = bytes.get(i) == Some(&b'/');
        if closing {
            i += 1;
        }

        let name_start = i;
        while i < bytes.len() && !matches!(bytes[i], b' ' | b'\t' | b'\n' | b'\r' | b'/' | b'>') {
            i += 1;
        }
        if i == name_start {
            return Err(XmlError::malformed(
                "Expected a tag name after '<'.",
                Span::from_range(start..i.min(bytes.len())),
                &self.xml[start..i.min(bytes.len())],
            ));
        }
        let name = &self.xml[name_start..i];

        let mut quote = None;
        loop {
            let Some(&b) = bytes.get(i) else {
                return Err(self.unterminated(bytes.len()));
            };
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None if b == b'"' || b == b'\'' => quote = Some(b),
                None if b == b'>' => break,
                None => {}
            }
            i += 1;
        }

        let part = if closing {
            TagPartType::Closing
        } else if bytes[i - 1] == b'/' {
            TagPartType::SelfClosing
        } else {
            TagPartType::Opening
        };
        let is_text_tag = self.text_tags.iter().any(|t| t == name);
        if is_text_tag {
            match part {
                TagPartType::Opening => self.text_depth += 1,
                TagPartType::Closing => self.text_depth = self.text_depth.saturating_sub(1),
                TagPartType::SelfClosing => {}
            }
        }

        let end = i + 1;
        self.tokens.push(XmlRawToken::TagPart {
            name: name.to_owned(),
            offset: to_offset(start),
            raw: self.xml[start..end].to_owned(),
            part,
            is_text_tag,
        });
        self.pos = end;
        Ok(())
    }

    fn unterminated(&self, end: usize) -> XmlError {
        let lexeme: String = self.xml[self.pos..end].chars().take(32).collect();
        XmlError::malformed(
            "Unterminated markup.",
            Span::from_range(self.pos..end),
            lexeme,
        )
    }
}

pub(crate) fn to_offset(pos: usize) -> u32 {
    u32::try_from(pos).unwrap_or(u32::MAX)
}
