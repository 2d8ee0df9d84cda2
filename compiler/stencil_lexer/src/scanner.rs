//! Hand-written scanner for one template group.
//!
//! Main dispatch matches on the current character; each arm calls a focused
//! method that consumes the lexeme and pushes one token. Keywords are
//! resolved from identifiers, numeric literals are converted here, and string
//! escapes are cooked so the parser only ever sees final values.

use bigdecimal::BigDecimal;
use std::str::FromStr;
use stencil_ir::{Literal, Token, TokenKind};
use tracing::trace;

use crate::cursor::Cursor;
use crate::{Delimiters, GroupSource, LexError};

pub struct Scanner<'a> {
    source: &'a GroupSource,
    delimiters: &'a Delimiters,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a GroupSource, delimiters: &'a Delimiters) -> Self {
        Scanner {
            source,
            delimiters,
            tokens: Vec::new(),
        }
    }

    pub fn scan(mut self) -> Result<Vec<Token>, LexError> {
        let text = self.source.text();
        let open = self.delimiters.open.as_str();
        let close = self.delimiters.close.as_str();

        if !text.starts_with(open) {
            return Err(LexError::new(
                format!("Template group must start with '{open}'."),
                self.source.span(0, text.len().min(1)),
                text,
            ));
        }
        if text.len() < open.len() + close.len() || !text.ends_with(close) {
            return Err(LexError::new(
                format!("Unclosed template group, expected '{close}'."),
                self.source.full_span(),
                text,
            ));
        }

        let inner_end = text.len() - close.len();
        self.push(TokenKind::DelimiterOpen, 0, open.len());

        let mut cursor = Cursor::new(text, open.len(), inner_end);
        loop {
            cursor.eat_while(is_whitespace);
            if cursor.is_eof() {
                break;
            }
            self.next_token(&mut cursor)?;
        }

        self.push(TokenKind::DelimiterClose, inner_end, text.len());
        trace!(count = self.tokens.len(), "scanned template group");
        Ok(self.tokens)
    }

    fn next_token(&mut self, cursor: &mut Cursor<'_>) -> Result<(), LexError> {
        let start = cursor.pos();
        let c = cursor.current();
        match c {
            '(' => self.single(cursor, TokenKind::LeftParen),
            ')' => self.single(cursor, TokenKind::RightParen),
            '[' => self.single(cursor, TokenKind::LeftBracket),
            ']' => self.single(cursor, TokenKind::RightBracket),
            ',' => self.single(cursor, TokenKind::Comma),
            '+' => self.single(cursor, TokenKind::Plus),
            '*' => self.single(cursor, TokenKind::Star),
            '/' => self.single(cursor, TokenKind::Slash),
            '%' => self.single(cursor, TokenKind::Percent),
            '|' => self.single(cursor, TokenKind::Pipe),
            '-' => self.either(cursor, '>', TokenKind::Arrow, TokenKind::Minus),
            '.' => self.either(cursor, '?', TokenKind::DotQuestion, TokenKind::Dot),
            '!' => self.either(cursor, '=', TokenKind::BangEqual, TokenKind::Bang),
            '=' => self.either(cursor, '=', TokenKind::EqualEqual, TokenKind::Equal),
            '>' => self.either(cursor, '=', TokenKind::GreaterEqual, TokenKind::Greater),
            '<' => self.either(cursor, '=', TokenKind::LessEqual, TokenKind::Less),
            '?' => self.question(cursor),
            '"' | '\u{201C}' | '\u{201D}' => self.string(cursor, is_double_quote),
            '\'' | '\u{2018}' | '\u{2019}' => self.string(cursor, is_single_quote),
            '@' => self.annotation(cursor),
            '0'..='9' => self.number(cursor),
            c if is_ident_start(c) => {
                self.identifier(cursor);
                Ok(())
            }
            _ => {
                cursor.advance();
                Err(self.error(format!("Unexpected character '{c}'."), cursor, start))
            }
        }
    }

    fn single(&mut self, cursor: &mut Cursor<'_>, kind: TokenKind) -> Result<(), LexError> {
        let start = cursor.pos();
        cursor.advance();
        self.push(kind, start, cursor.pos());
        Ok(())
    }

    /// One- or two-character operator: `kind2` if the next char is `second`.
    fn either(
        &mut self,
        cursor: &mut Cursor<'_>,
        second: char,
        kind2: TokenKind,
        kind1: TokenKind,
    ) -> Result<(), LexError> {
        let start = cursor.pos();
        cursor.advance();
        let kind = if cursor.eat(second) { kind2 } else { kind1 };
        self.push(kind, start, cursor.pos());
        Ok(())
    }

    fn question(&mut self, cursor: &mut Cursor<'_>) -> Result<(), LexError> {
        let start = cursor.pos();
        cursor.advance();
        if cursor.eat('?') {
            self.push(TokenKind::QuestionQuestion, start, cursor.pos());
            Ok(())
        } else {
            Err(self.error("Expected '??'.", cursor, start))
        }
    }

    fn string(
        &mut self,
        cursor: &mut Cursor<'_>,
        is_quote: fn(char) -> bool,
    ) -> Result<(), LexError> {
        let start = cursor.pos();
        cursor.advance();
        let mut value = String::new();
        loop {
            if cursor.is_eof() {
                return Err(self.error("Unterminated string.", cursor, start));
            }
            let c = cursor.current();
            if is_quote(c) {
                cursor.advance();
                break;
            }
            if c == '\\' {
                let escape_start = cursor.pos();
                cursor.advance();
                let escaped = match cursor.current() {
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    '\\' => '\\',
                    '"' => '"',
                    '\'' => '\'',
                    other => {
                        cursor.advance();
                        return Err(self.error(
                            format!("Invalid escape sequence '\\{other}'."),
                            cursor,
                            escape_start,
                        ));
                    }
                };
                cursor.advance();
                value.push(escaped);
                continue;
            }
            value.push(c);
            cursor.advance();
        }
        self.push_literal(TokenKind::String, start, cursor.pos(), Literal::Str(value));
        Ok(())
    }

    fn annotation(&mut self, cursor: &mut Cursor<'_>) -> Result<(), LexError> {
        let start = cursor.pos();
        cursor.advance();
        let name_start = cursor.pos();
        cursor.eat_while(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'));
        if cursor.pos() == name_start {
            return Err(self.error("Expected a tag name after '@'.", cursor, start));
        }
        let name = cursor.slice(name_start, cursor.pos()).to_owned();
        self.tokens.push(Token::new(
            TokenKind::At,
            name,
            self.source.span(start, cursor.pos()),
        ));
        Ok(())
    }

    fn number(&mut self, cursor: &mut Cursor<'_>) -> Result<(), LexError> {
        let start = cursor.pos();
        cursor.eat_while(|c| c.is_ascii_digit());
        let mut fractional = false;
        if cursor.current() == '.' && cursor.peek().is_ascii_digit() {
            fractional = true;
            cursor.advance();
            cursor.eat_while(|c| c.is_ascii_digit());
        }
        let digits = cursor.slice(start, cursor.pos());

        let suffix = cursor.current();
        let literal = match suffix {
            'L' | 'l' if !fractional => {
                cursor.advance();
                digits.parse::<i64>().ok().map(Literal::Long)
            }
            'f' | 'F' => {
                cursor.advance();
                digits.parse::<f32>().ok().map(Literal::Float)
            }
            'd' | 'D' => {
                cursor.advance();
                digits.parse::<f64>().ok().map(Literal::Double)
            }
            'm' | 'M' => {
                cursor.advance();
                BigDecimal::from_str(digits).ok().map(Literal::Decimal)
            }
            _ if fractional => digits.parse::<f64>().ok().map(Literal::Double),
            _ => match digits.parse::<i32>() {
                Ok(v) => Some(Literal::Int(v)),
                Err(_) => digits.parse::<i64>().ok().map(Literal::Long),
            },
        };

        if is_ident_continue(cursor.current()) {
            cursor.eat_while(is_ident_continue);
            return Err(self.error("Invalid number literal.", cursor, start));
        }
        match literal {
            Some(literal) => {
                self.push_literal(TokenKind::Number, start, cursor.pos(), literal);
                Ok(())
            }
            None => Err(self.error("Number literal out of range.", cursor, start)),
        }
    }

    fn identifier(&mut self, cursor: &mut Cursor<'_>) {
        let start = cursor.pos();
        cursor.eat_while(is_ident_continue);
        let text = cursor.slice(start, cursor.pos());
        let kind = TokenKind::keyword(text).unwrap_or(TokenKind::Identifier);
        self.push(kind, start, cursor.pos());
    }

    fn push(&mut self, kind: TokenKind, start: usize, end: usize) {
        let lexeme = self.source.text().get(start..end).unwrap_or("");
        self.tokens
            .push(Token::new(kind, lexeme, self.source.span(start, end)));
    }

    fn push_literal(&mut self, kind: TokenKind, start: usize, end: usize, literal: Literal) {
        self.push(kind, start, end);
        if let Some(token) = self.tokens.last_mut() {
            token.literal = Some(literal);
        }
    }

    fn error(&self, message: impl Into<String>, cursor: &Cursor<'_>, start: usize) -> LexError {
        LexError::new(
            message,
            self.source.span(start, cursor.pos()),
            cursor.slice(start, cursor.pos()),
        )
    }
}

fn is_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{00A0}'
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

fn is_double_quote(c: char) -> bool {
    matches!(c, '"' | '\u{201C}' | '\u{201D}')
}

fn is_single_quote(c: char) -> bool {
    matches!(c, '\'' | '\u{2018}' | '\u{2019}')
}
