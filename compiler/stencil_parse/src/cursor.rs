//! Token cursor over one template group.

use stencil_ir::{Span, Token, TokenKind};

/// Position within the tokens of a single group.
///
/// Reading past the end yields a synthetic `Eof` token placed at the end of
/// the group, so lookahead never needs bounds checks.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    eof: Token,
}

impl<'a> Cursor<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        let end = tokens.last().map_or(Span::DUMMY, |t| Span::point(t.span.end));
        Cursor {
            tokens,
            pos: 0,
            eof: Token::new(TokenKind::Eof, "", end),
        }
    }

    #[inline]
    pub fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&self.eof)
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Kind of the token `n` positions ahead of the current one.
    #[inline]
    pub fn peek_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    #[inline]
    pub fn check(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Consume the current token and return it; at the end this is the
    /// `Eof` token and the position does not move.
    pub fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it has the given kind.
    pub fn eat(&mut self, kind: TokenKind) -> Option<Token> {
        self.check(kind).then(|| self.advance())
    }

    /// Lexeme of the group's closing delimiter, for error messages.
    pub fn closing_lexeme(&self) -> &str {
        self.tokens
            .last()
            .filter(|t| t.kind == TokenKind::DelimiterClose)
            .map_or("}", |t| t.lexeme.as_str())
    }

    pub fn previous(&self) -> Option<&'a Token> {
        self.pos.checked_sub(1).and_then(|i| self.tokens.get(i))
    }
}
