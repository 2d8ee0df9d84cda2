//! Template-group extraction.
//!
//! Walks the raw tokens, scanning eligible text content for delimited
//! groups. A group may start in one text run and end in a later one (word
//! processors split text at every formatting change); in that case the group
//! token takes the place of the opening delimiter, markup in between is kept
//! in order, and the text the group consumed is dropped from the stream.

use memchr::memchr;
use stencil_ir::{GroupTable, Span, XmlInputToken, XmlRawToken};
use stencil_lexer::{scan_group, Delimiters, GroupSource};
use tracing::{debug, trace};

use crate::tokenizer::to_offset;
use crate::{classify, TagNicknames, XmlError};

/// Token stream with groups lifted out, plus the table they live in.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExtractedDocument {
    pub tokens: Vec<XmlInputToken>,
    pub groups: GroupTable,
}

/// Lift template groups out of text content.
///
/// Content is eligible when it sits inside a text element, or at the top
/// level of a fragment with no enclosing element at all.
#[tracing::instrument(level = "debug", skip_all)]
pub fn extract_groups(
    raw: Vec<XmlRawToken>,
    delimiters: &Delimiters,
    nicknames: &TagNicknames,
) -> Result<ExtractedDocument, XmlError> {
    let mut extractor = Extractor {
        delimiters,
        nicknames,
        open: delimiters.open.chars().collect(),
        close: delimiters.close.chars().collect(),
        out: Vec::with_capacity(raw.len()),
        groups: GroupTable::new(),
        depth: 0,
        pending: None,
    };

    for token in raw {
        match token {
            XmlRawToken::Content {
                offset,
                text,
                inside_text_tag,
            } if inside_text_tag || extractor.depth == 0 => {
                extractor.content(offset, &text, inside_text_tag)?;
            }
            XmlRawToken::TagPart { part, .. } => {
                match part {
                    stencil_ir::TagPartType::Opening => extractor.depth += 1,
                    stencil_ir::TagPartType::Closing => {
                        extractor.depth = extractor.depth.saturating_sub(1);
                    }
                    stencil_ir::TagPartType::SelfClosing => {}
                }
                extractor.out.push(XmlInputToken::Raw(token));
            }
            other => extractor.out.push(XmlInputToken::Raw(other)),
        }
    }

    if let Some(pending) = extractor.pending {
        return Err(XmlError::malformed(
            format!(
                "Unclosed template group, expected '{}'.",
                delimiters.close
            ),
            Span::new(pending.start, pending.start.saturating_add(1)),
            pending.source.text(),
        ));
    }

    debug!(groups = extractor.groups.len(), "extracted template groups");
    Ok(ExtractedDocument {
        tokens: extractor.out,
        groups: extractor.groups,
    })
}

struct Extractor<'a> {
    delimiters: &'a Delimiters,
    nicknames: &'a TagNicknames,
    open: Vec<char>,
    close: Vec<char>,
    out: Vec<XmlInputToken>,
    groups: GroupTable,
    depth: u32,
    pending: Option<Pending>,
}

/// A group whose closing delimiter has not been seen yet.
struct Pending {
    source: GroupSource,
    /// Index in `out` reserved for the group token.
    slot: usize,
    start: u32,
    quote: Option<Quote>,
    escaped: bool,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Quote {
    Double,
    Single,
}

impl Quote {
    fn of(c: char) -> Option<Quote> {
        match c {
            '"' | '\u{201C}' | '\u{201D}' => Some(Quote::Double),
            '\'' | '\u{2018}' | '\u{2019}' => Some(Quote::Single),
            _ => None,
        }
    }
}

/// One decoded character and the byte range of the text it came from.
#[derive(Copy, Clone)]
struct Unit {
    ch: char,
    start: usize,
    end: usize,
}

impl Extractor<'_> {
    fn content(&mut self, offset: u32, text: &str, inside_text_tag: bool) -> Result<(), XmlError> {
        let units = decode(text);
        let origin = |u: &Unit| offset.saturating_add(to_offset(u.start));
        let mut flushed = 0;
        let mut i = 0;

        while i < units.len() {
            let unit = units[i];
            if self.pending.is_none() {
                if matches_at(&units, i, &self.open) {
                    if unit.start > flushed {
                        self.out.push(literal(offset, text, flushed, unit.start, inside_text_tag));
                    }
                    let mut source = GroupSource::new();
                    for u in &units[i..i + self.open.len()] {
                        source.push_char(u.ch, origin(u));
                    }
                    self.pending = Some(Pending {
                        source,
                        slot: self.out.len(),
                        start: origin(&unit),
                        quote: None,
                        escaped: false,
                    });
                    // Placeholder until the group closes.
                    self.out.push(XmlInputToken::Sentinel);
                    i += self.open.len();
                } else {
                    i += 1;
                }
                continue;
            }
            let Some(pending) = self.pending.as_mut() else {
                continue;
            };

            if let Some(quote) = pending.quote {
                pending.source.push_char(unit.ch, origin(&unit));
                if pending.escaped {
                    pending.escaped = false;
                } else if unit.ch == '\\' {
                    pending.escaped = true;
                } else if Quote::of(unit.ch) == Some(quote) {
                    pending.quote = None;
                }
                i += 1;
                continue;
            }

            if matches_at(&units, i, &self.close) {
                let last = units[i + self.close.len() - 1];
                for u in &units[i..i + self.close.len()] {
                    pending.source.push_char(u.ch, origin(u));
                }
                pending
                    .source
                    .finish(offset.saturating_add(to_offset(last.end)));
                self.close_group()?;
                i += self.close.len();
                flushed = last.end;
                continue;
            }

            pending.quote = Quote::of(unit.ch);
            pending.source.push_char(unit.ch, origin(&unit));
            i += 1;
        }

        if self.pending.is_none() && flushed < text.len() {
            self.out
                .push(literal(offset, text, flushed, text.len(), inside_text_tag));
        }
        Ok(())
    }

    fn close_group(&mut self) -> Result<(), XmlError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        let span = pending.source.full_span();
        let tokens = scan_group(&pending.source, self.delimiters)?;
        let group = classify(tokens, span, self.nicknames)?;
        trace!(kind = ?group.kind, ?span, "extracted template group");
        let id = self.groups.push(group);
        self.out[pending.slot] = XmlInputToken::Group(id);
        Ok(())
    }
}

fn literal(offset: u32, text: &str, start: usize, end: usize, inside_text_tag: bool) -> XmlInputToken {
    XmlInputToken::Raw(XmlRawToken::Content {
        offset: offset.saturating_add(to_offset(start)),
        text: text[start..end].to_owned(),
        inside_text_tag,
    })
}

fn matches_at(units: &[Unit], at: usize, delimiter: &[char]) -> bool {
    !delimiter.is_empty()
        && delimiter
            .iter()
            .enumerate()
            .all(|(k, c)| units.get(at + k).is_some_and(|u| u.ch == *c))
}

/// Decode character data, resolving predefined and numeric entities.
fn decode(text: &str) -> Vec<Unit> {
    let mut units = Vec::with_capacity(text.len());
    let mut pos = 0;
    while let Some(c) = text[pos..].chars().next() {
        let (ch, len) = if c == '&' {
            decode_entity(&text[pos..]).unwrap_or(('&', 1))
        } else {
            (c, c.len_utf8())
        };
        units.push(Unit {
            ch,
            start: pos,
            end: pos + len,
        });
        pos += len;
    }
    units
}

fn decode_entity(rest: &str) -> Option<(char, usize)> {
    let bytes = rest.as_bytes();
    let semi = memchr(b';', bytes.get(..12).unwrap_or(bytes))?;
    let name = &rest[1..semi];
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let code = match name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => name.strip_prefix('#')?.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((ch, semi + 1))
}
