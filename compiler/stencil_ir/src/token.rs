//! Template tokens.
//!
//! A template group such as `{for item in items}` scans into
//! `DelimiterOpen For Identifier In Identifier DelimiterClose`. Tokens are
//! immutable once scanned and carry the span of their lexeme in the document.

use std::fmt;

use bigdecimal::BigDecimal;

use crate::Span;

/// Token type tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Group delimiters
    DelimiterOpen,
    DelimiterClose,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    Comma,
    Dot,
    DotQuestion,
    Arrow,
    Pipe,

    // Operators
    Minus,
    Plus,
    Slash,
    Star,
    Percent,
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    QuestionQuestion,

    // Literals
    Identifier,
    String,
    Number,

    /// Expansion target annotation, e.g. `@w:tr`. The lexeme holds the name
    /// without the `@`.
    At,

    // Keywords
    And,
    Or,
    Not,
    True,
    False,
    Null,
    For,
    In,
    If,
    End,
    Do,
    Var,
    Insert,
    Rewrite,
    Case,
    When,
    Then,
    Else,

    Eof,
}

impl TokenKind {
    /// Look up a keyword by its source text.
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "for" => TokenKind::For,
            "in" => TokenKind::In,
            "if" => TokenKind::If,
            "end" => TokenKind::End,
            "do" => TokenKind::Do,
            "var" => TokenKind::Var,
            "insert" => TokenKind::Insert,
            "rewrite" => TokenKind::Rewrite,
            "case" => TokenKind::Case,
            "when" => TokenKind::When,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            _ => return None,
        };
        Some(kind)
    }

    /// Human-readable name used in "expected X" messages.
    pub fn display_name(self) -> &'static str {
        match self {
            TokenKind::DelimiterOpen => "opening delimiter",
            TokenKind::DelimiterClose => "closing delimiter",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Dot => "'.'",
            TokenKind::DotQuestion => "'.?'",
            TokenKind::Arrow => "'->'",
            TokenKind::Pipe => "'|'",
            TokenKind::Minus => "'-'",
            TokenKind::Plus => "'+'",
            TokenKind::Slash => "'/'",
            TokenKind::Star => "'*'",
            TokenKind::Percent => "'%'",
            TokenKind::Bang => "'!'",
            TokenKind::BangEqual => "'!='",
            TokenKind::Equal => "'='",
            TokenKind::EqualEqual => "'=='",
            TokenKind::Greater => "'>'",
            TokenKind::GreaterEqual => "'>='",
            TokenKind::Less => "'<'",
            TokenKind::LessEqual => "'<='",
            TokenKind::QuestionQuestion => "'??'",
            TokenKind::Identifier => "identifier",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::At => "expansion target",
            TokenKind::And => "'and'",
            TokenKind::Or => "'or'",
            TokenKind::Not => "'not'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Null => "'null'",
            TokenKind::For => "'for'",
            TokenKind::In => "'in'",
            TokenKind::If => "'if'",
            TokenKind::End => "'end'",
            TokenKind::Do => "'do'",
            TokenKind::Var => "'var'",
            TokenKind::Insert => "'insert'",
            TokenKind::Rewrite => "'rewrite'",
            TokenKind::Case => "'case'",
            TokenKind::When => "'when'",
            TokenKind::Then => "'then'",
            TokenKind::Else => "'else'",
            TokenKind::Eof => "end of template",
        }
    }
}

/// Literal payload of a `String` or `Number` token.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Decimal(BigDecimal),
}

/// A scanned token.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, span: Span) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            literal: None,
            span,
        }
    }

    #[must_use]
    pub fn with_literal(mut self, literal: Literal) -> Self {
        self.literal = Some(literal);
        self
    }

    /// Synthesized identifier token, used by tests and by hosts building
    /// expressions programmatically.
    pub fn identifier(name: &str) -> Self {
        Token::new(TokenKind::Identifier, name, Span::DUMMY)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::Eof {
            f.write_str("end of template")
        } else {
            write!(f, "'{}'", self.lexeme)
        }
    }
}
