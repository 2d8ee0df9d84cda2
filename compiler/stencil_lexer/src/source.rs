//! Group source text with its document offset map.

use stencil_ir::Span;

/// Unescaped group text plus, for each byte, the document offset it came
/// from. `offsets` has one extra trailing entry marking the end position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GroupSource {
    text: String,
    offsets: Vec<u32>,
}

impl GroupSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text that sits contiguously in the document starting at `base`.
    pub fn contiguous(text: &str, base: u32) -> Self {
        let mut source = GroupSource::new();
        source.push_str(text, base);
        source.finish(base.saturating_add(u32::try_from(text.len()).unwrap_or(u32::MAX)));
        source
    }

    /// Append `text` whose first byte lives at document offset `base`, one
    /// document byte per text byte.
    pub fn push_str(&mut self, text: &str, base: u32) {
        self.text.push_str(text);
        self.offsets
            .extend((0..text.len()).map(|i| base.saturating_add(u32::try_from(i).unwrap_or(u32::MAX))));
    }

    /// Append a single character that was decoded from the document range
    /// starting at `origin` (e.g. `&amp;` → `&`). All its bytes map to
    /// `origin`.
    pub fn push_char(&mut self, c: char, origin: u32) {
        self.text.push(c);
        self.offsets
            .extend(std::iter::repeat(origin).take(c.len_utf8()));
    }

    /// Record the document offset just past the last byte.
    pub fn finish(&mut self, end: u32) {
        self.offsets.push(end);
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Document offset of text byte `pos`.
    pub fn offset(&self, pos: usize) -> u32 {
        self.offsets
            .get(pos)
            .or_else(|| self.offsets.last())
            .copied()
            .unwrap_or(0)
    }

    /// Document span of the text byte range `start..end`.
    pub fn span(&self, start: usize, end: usize) -> Span {
        let doc_start = self.offset(start);
        let doc_end = if end > start {
            self.offset(end - 1) + 1
        } else {
            doc_start
        };
        Span::new(doc_start, doc_end.max(doc_start))
    }

    /// Document span of the whole group.
    pub fn full_span(&self) -> Span {
        self.span(0, self.text.len())
    }
}
