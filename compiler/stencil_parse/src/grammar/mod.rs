//! Statement parsing.
//!
//! Each template group yields one statement. Block groups consume the
//! stream after them up to their `{end}` group.

mod expr;
mod operators;

use stencil_ir::{
    GroupKind, RewriteBlock, Stmt, TemplateGroup, Token, TokenKind, XmlInputToken,
};

use crate::{Cursor, ParseError, Parser};

impl<'a> Parser<'a> {
    /// Parse stream items until the `{end}` closing `opener`, or until the
    /// end of the stream at the top level.
    pub(crate) fn parse_body(
        &mut self,
        opener: Option<&'a TemplateGroup>,
    ) -> Result<Vec<Stmt>, ParseError> {
        let (stream, groups) = (self.stream, self.groups);
        let mut stmts = Vec::new();
        while let Some(item) = stream.get(self.pos) {
            self.pos += 1;
            let XmlInputToken::Group(id) = item else {
                stmts.push(Stmt::Verbatim(item.clone()));
                continue;
            };
            let group = groups.get(*id);
            if group.kind == GroupKind::End {
                self.enter(group)?;
                let end = self.expect(TokenKind::End, "Expected 'end'.")?;
                self.expect_close("after 'end'")?;
                if opener.is_none() {
                    return Err(ParseError::at(&end, "Unexpected 'end' without an open block."));
                }
                return Ok(stmts);
            }
            stmts.push(self.parse_group(group)?);
        }

        if let Some(keyword) = opener.and_then(TemplateGroup::head) {
            return Err(ParseError::at(
                keyword,
                format!("Missing 'end' for '{}' block.", keyword.lexeme),
            ));
        }
        Ok(stmts)
    }

    fn enter(&mut self, group: &'a TemplateGroup) -> Result<(), ParseError> {
        self.cursor = Cursor::new(&group.tokens);
        self.expect(TokenKind::DelimiterOpen, "Expected the start of a template group.")?;
        Ok(())
    }

    fn parse_group(&mut self, group: &'a TemplateGroup) -> Result<Stmt, ParseError> {
        self.enter(group)?;
        match self.cursor.current_kind() {
            TokenKind::For => self.parse_for(group),
            TokenKind::If => self.parse_if(group),
            TokenKind::Insert => Ok(Stmt::Insert(self.parse_rewrite_block(group)?)),
            TokenKind::Rewrite => Ok(Stmt::Rewrite(self.parse_rewrite_block(group)?)),
            TokenKind::Do => {
                self.cursor.advance();
                let expr = self.parse_expr()?;
                self.expect_close("after 'do' expression")?;
                Ok(Stmt::Do { expr })
            }
            TokenKind::Var => self.parse_var(),
            _ => {
                let expr = self.parse_expr()?;
                self.expect_close("after expression")?;
                Ok(Stmt::Expression { expr })
            }
        }
    }

    fn parse_for(&mut self, group: &'a TemplateGroup) -> Result<Stmt, ParseError> {
        let keyword = self.cursor.advance();
        let variable = self.expect(
            TokenKind::Identifier,
            "Expected a loop variable name after 'for'.",
        )?;
        self.expect(TokenKind::In, "Expected 'in' after the loop variable.")?;
        let iterable = self.parse_expr()?;
        self.expect_close("after the loop header")?;
        let body = self.parse_body(Some(group))?;
        Ok(Stmt::For {
            keyword,
            variable,
            iterable,
            body,
        })
    }

    fn parse_if(&mut self, group: &'a TemplateGroup) -> Result<Stmt, ParseError> {
        let keyword = self.cursor.advance();
        let condition = self.parse_expr()?;
        self.expect_close("after the 'if' condition")?;
        let body = self.parse_body(Some(group))?;
        Ok(Stmt::If {
            keyword,
            condition,
            body,
        })
    }

    /// `insert`/`rewrite`: the body starts with a sentinel marking where
    /// rewriters may splice content.
    fn parse_rewrite_block(&mut self, group: &'a TemplateGroup) -> Result<RewriteBlock, ParseError> {
        let keyword = self.cursor.advance();
        let target = self.parse_expr()?;
        self.expect_close(&format!("after '{}' target", keyword.lexeme))?;
        let mut body = vec![Stmt::Verbatim(XmlInputToken::Sentinel)];
        body.extend(self.parse_body(Some(group))?);
        Ok(RewriteBlock {
            keyword,
            target,
            body,
        })
    }

    fn parse_var(&mut self) -> Result<Stmt, ParseError> {
        self.cursor.advance();
        let name = self.expect(
            TokenKind::Identifier,
            "Expected a variable name after 'var'.",
        )?;
        let initializer = if self.cursor.eat(TokenKind::Equal).is_some() {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.expect_close("after variable declaration")?;
        Ok(Stmt::Var { name, initializer })
    }

    pub(crate) fn expect(&mut self, kind: TokenKind, message: &str) -> Result<Token, ParseError> {
        self.cursor
            .eat(kind)
            .ok_or_else(|| ParseError::at(self.cursor.current(), message))
    }

    fn expect_close(&mut self, context: &str) -> Result<(), ParseError> {
        if self.cursor.eat(TokenKind::DelimiterClose).is_some() {
            return Ok(());
        }
        let message = format!("Expected '{}' {context}.", self.cursor.closing_lexeme());
        Err(ParseError::at(self.cursor.current(), message))
    }
}
