//! Expression parsing.
//!
//! Precedence, lowest first: assignment, pipe, `??`, `or`, `and`,
//! equality, comparison, additive, multiplicative, unary, call/member,
//! primary. Every binary level is left-associative.

use stencil_ir::{
    BinaryOp, CaseBranch, Expr, ExprId, ExprKind, Literal, LiteralValue, LogicalOp, Span, Token,
    TokenKind,
};
use stencil_stack::ensure_sufficient_stack;

use crate::{ParseError, Parser};

impl Parser<'_> {
    /// Parse an expression.
    ///
    /// Uses `ensure_sufficient_stack` so deeply nested source cannot
    /// overflow the native stack.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        ensure_sufficient_stack(|| self.parse_assignment())
    }

    /// `name = value` or `object.name = value`.
    fn parse_assignment(&mut self) -> Result<ExprId, ParseError> {
        let target = self.parse_pipe()?;
        let Some(equals) = self.cursor.eat(TokenKind::Equal) else {
            return Ok(target);
        };
        let value = self.parse_expr()?;
        let span = self.arena.span(target).merge(self.arena.span(value));
        let kind = match self.arena.kind(target) {
            ExprKind::Variable { name } => ExprKind::Assign {
                name: name.clone(),
                value,
            },
            ExprKind::Get { object, name } => ExprKind::Set {
                object: *object,
                name: name.clone(),
                value,
            },
            _ => return Err(ParseError::at(&equals, "Invalid assignment target.")),
        };
        // The target node becomes the assignment; nothing else refers to it.
        self.arena.replace(target, Expr::new(kind, span));
        Ok(target)
    }

    /// `value | f(args)` and `value | f`.
    fn parse_pipe(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_coalesce()?;
        while let Some(token) = self.cursor.eat(TokenKind::Pipe) {
            let right = self.parse_coalesce()?;
            let span = self.arena.span(left).merge(self.arena.span(right));
            left = self.alloc(ExprKind::Pipe { left, token, right }, span);
        }
        Ok(left)
    }

    fn parse_coalesce(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_or()?;
        while let Some(token) = self.cursor.eat(TokenKind::QuestionQuestion) {
            let right = self.parse_or()?;
            let span = self.arena.span(left).merge(self.arena.span(right));
            left = self.alloc(ExprKind::NullCoalesce { left, token, right }, span);
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_and()?;
        while let Some(token) = self.cursor.eat(TokenKind::Or) {
            let right = self.parse_and()?;
            left = self.logical(left, LogicalOp::Or, token, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_equality()?;
        while let Some(token) = self.cursor.eat(TokenKind::And) {
            let right = self.parse_equality()?;
            left = self.logical(left, LogicalOp::And, token, right);
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_comparison()?;
        while let Some(op) = self.match_equality_op() {
            let token = self.cursor.advance();
            let right = self.parse_comparison()?;
            left = self.binary(left, op, token, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_additive()?;
        while let Some(op) = self.match_comparison_op() {
            let token = self.cursor.advance();
            let right = self.parse_additive()?;
            left = self.binary(left, op, token, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = self.match_additive_op() {
            let token = self.cursor.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(left, op, token, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.match_multiplicative_op() {
            let token = self.cursor.advance();
            let right = self.parse_unary()?;
            left = self.binary(left, op, token, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<ExprId, ParseError> {
        let Some(op) = self.match_unary_op() else {
            return self.parse_postfix();
        };
        let token = self.cursor.advance();
        let operand = ensure_sufficient_stack(|| self.parse_unary())?;
        let span = token.span.merge(self.arena.span(operand));
        Ok(self.alloc(ExprKind::Unary { op, token, operand }, span))
    }

    /// Calls, `.name` and `.?name`.
    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.cursor.current_kind() {
                TokenKind::LeftParen => {
                    self.cursor.advance();
                    let args = self.parse_arguments()?;
                    let paren =
                        self.expect(TokenKind::RightParen, "Expected ')' after arguments.")?;
                    let span = self.arena.span(expr).merge(paren.span);
                    expr = self.alloc(
                        ExprKind::Call {
                            callee: expr,
                            paren,
                            args,
                        },
                        span,
                    );
                }
                TokenKind::Dot | TokenKind::DotQuestion => {
                    let optional = self.cursor.advance().kind == TokenKind::DotQuestion;
                    let name = self.parse_member_name()?;
                    let span = self.arena.span(expr).merge(name.span);
                    let kind = if optional {
                        ExprKind::OptionalGet { object: expr, name }
                    } else {
                        ExprKind::Get { object: expr, name }
                    };
                    expr = self.alloc(kind, span);
                }
                _ => return Ok(expr),
            }
        }
    }

    fn parse_arguments(&mut self) -> Result<Vec<ExprId>, ParseError> {
        let mut args = Vec::new();
        if self.cursor.check(TokenKind::RightParen) {
            return Ok(args);
        }
        loop {
            args.push(self.parse_expr()?);
            if self.cursor.eat(TokenKind::Comma).is_none() {
                return Ok(args);
            }
        }
    }

    /// Property names may be identifiers or keywords (`row.end`).
    fn parse_member_name(&mut self) -> Result<Token, ParseError> {
        let token = self.cursor.current();
        if token.kind == TokenKind::Identifier || TokenKind::keyword(&token.lexeme).is_some() {
            Ok(self.cursor.advance())
        } else {
            Err(ParseError::at(token, "Expected a property name after '.'."))
        }
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let token = self.cursor.current();
        match token.kind {
            TokenKind::Number | TokenKind::String => {
                let value = match &token.literal {
                    Some(Literal::Str(s)) => LiteralValue::Str(s.clone()),
                    Some(Literal::Int(v)) => LiteralValue::Int(*v),
                    Some(Literal::Long(v)) => LiteralValue::Long(*v),
                    Some(Literal::Float(v)) => LiteralValue::Float(*v),
                    Some(Literal::Double(v)) => LiteralValue::Double(*v),
                    Some(Literal::Decimal(v)) => LiteralValue::Decimal(v.clone()),
                    None => return Err(ParseError::at(token, "Invalid literal.")),
                };
                Ok(self.literal(value))
            }
            TokenKind::True => Ok(self.literal(LiteralValue::Bool(true))),
            TokenKind::False => Ok(self.literal(LiteralValue::Bool(false))),
            TokenKind::Null => Ok(self.literal(LiteralValue::Null)),
            TokenKind::Identifier if self.cursor.peek_kind(1) == TokenKind::Arrow => {
                let param = self.cursor.advance();
                self.parse_lambda_body(param.span, vec![param])
            }
            TokenKind::Identifier => {
                let name = self.cursor.advance();
                let span = name.span;
                Ok(self.alloc(ExprKind::Variable { name }, span))
            }
            TokenKind::LeftParen if self.at_lambda_params() => self.parse_lambda(),
            TokenKind::LeftParen => {
                let open = self.cursor.advance();
                let inner = self.parse_expr()?;
                let close =
                    self.expect(TokenKind::RightParen, "Expected ')' after expression.")?;
                Ok(self.alloc(ExprKind::Grouping(inner), open.span.merge(close.span)))
            }
            TokenKind::LeftBracket => self.parse_list(),
            TokenKind::Case => self.parse_case(),
            _ => Err(ParseError::at(token, "Expected an expression.")),
        }
    }

    /// Lookahead for `(` [ident {, ident}] `)` `->`.
    fn at_lambda_params(&self) -> bool {
        let mut n = 1;
        if self.cursor.peek_kind(n) == TokenKind::RightParen {
            return self.cursor.peek_kind(n + 1) == TokenKind::Arrow;
        }
        loop {
            if self.cursor.peek_kind(n) != TokenKind::Identifier {
                return false;
            }
            match self.cursor.peek_kind(n + 1) {
                TokenKind::Comma => n += 2,
                TokenKind::RightParen => return self.cursor.peek_kind(n + 2) == TokenKind::Arrow,
                _ => return false,
            }
        }
    }

    fn parse_lambda(&mut self) -> Result<ExprId, ParseError> {
        let open = self.cursor.advance();
        let mut params = Vec::new();
        while let Some(param) = self.cursor.eat(TokenKind::Identifier) {
            params.push(param);
            if self.cursor.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::RightParen, "Expected ')' after lambda parameters.")?;
        self.parse_lambda_body(open.span, params)
    }

    fn parse_lambda_body(&mut self, start: Span, params: Vec<Token>) -> Result<ExprId, ParseError> {
        self.expect(TokenKind::Arrow, "Expected '->' after lambda parameters.")?;
        let body = self.parse_expr()?;
        let span = start.merge(self.arena.span(body));
        Ok(self.alloc(ExprKind::Lambda { params, body }, span))
    }

    fn parse_list(&mut self) -> Result<ExprId, ParseError> {
        let bracket = self.cursor.advance();
        let mut elements = Vec::new();
        if !self.cursor.check(TokenKind::RightBracket) {
            loop {
                elements.push(self.parse_expr()?);
                if self.cursor.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
        }
        let close = self.expect(TokenKind::RightBracket, "Expected ']' after list elements.")?;
        let span = bracket.span.merge(close.span);
        Ok(self.alloc(ExprKind::List { bracket, elements }, span))
    }

    /// `case when c then r [when c then r]* [else r] end`
    fn parse_case(&mut self) -> Result<ExprId, ParseError> {
        let keyword = self.cursor.advance();
        let mut branches = Vec::new();
        while self.cursor.eat(TokenKind::When).is_some() {
            let condition = self.parse_expr()?;
            self.expect(TokenKind::Then, "Expected 'then' after 'when' condition.")?;
            let result = self.parse_expr()?;
            branches.push(CaseBranch { condition, result });
        }
        if branches.is_empty() {
            return Err(ParseError::at(
                self.cursor.current(),
                "Expected 'when' after 'case'.",
            ));
        }
        let otherwise = if self.cursor.eat(TokenKind::Else).is_some() {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let end = self.expect(TokenKind::End, "Expected 'end' after 'case' branches.")?;
        let span = keyword.span.merge(end.span);
        Ok(self.alloc(
            ExprKind::Case {
                keyword,
                branches,
                otherwise,
            },
            span,
        ))
    }

    fn literal(&mut self, value: LiteralValue) -> ExprId {
        let token = self.cursor.advance();
        self.alloc(ExprKind::Literal(value), token.span)
    }

    fn binary(&mut self, left: ExprId, op: BinaryOp, token: Token, right: ExprId) -> ExprId {
        let span = self.arena.span(left).merge(self.arena.span(right));
        self.alloc(
            ExprKind::Binary {
                left,
                op,
                token,
                right,
            },
            span,
        )
    }

    fn logical(&mut self, left: ExprId, op: LogicalOp, token: Token, right: ExprId) -> ExprId {
        let span = self.arena.span(left).merge(self.arena.span(right));
        self.alloc(
            ExprKind::Logical {
                left,
                op,
                token,
                right,
            },
            span,
        )
    }

    fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc(Expr::new(kind, span))
    }
}
