//! Character cursor over group text.

/// Byte-position cursor that steps by `char`.
///
/// Group text is short and may contain typographic quotes or non-breaking
/// spaces pasted in by word processors, so the cursor works on decoded
/// characters rather than raw bytes.
pub(crate) struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    end: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str, start: usize, end: usize) -> Self {
        Cursor {
            text,
            pos: start,
            end: end.min(text.len()),
        }
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.end
    }

    /// Current character, or `'\0'` at the end.
    #[inline]
    pub(crate) fn current(&self) -> char {
        self.nth(0)
    }

    #[inline]
    pub(crate) fn peek(&self) -> char {
        self.nth(1)
    }

    fn nth(&self, n: usize) -> char {
        self.text
            .get(self.pos..self.end)
            .and_then(|rest| rest.chars().nth(n))
            .unwrap_or('\0')
    }

    #[inline]
    pub(crate) fn advance(&mut self) {
        if !self.is_eof() {
            self.pos += self.current().len_utf8();
        }
    }

    /// Advance if the current character is `c`.
    pub(crate) fn eat(&mut self, c: char) -> bool {
        if !self.is_eof() && self.current() == c {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while !self.is_eof() && pred(self.current()) {
            self.advance();
        }
    }

    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        self.text.get(start..end).unwrap_or("")
    }
}
