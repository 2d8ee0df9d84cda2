//! Group classification.

use stencil_ir::{
    ExpansionDirection, ExpansionTarget, GroupKind, Span, TemplateGroup, Token, TokenKind,
};

use crate::{TagNicknames, XmlError};

/// Build a [`TemplateGroup`] from the scanned tokens of one group.
///
/// The leading keyword decides the kind. A trailing `@name` annotation on an
/// opener becomes its explicit expansion target (nicknames resolved) and is
/// removed from the token list.
pub fn classify(
    mut tokens: Vec<Token>,
    span: Span,
    nicknames: &TagNicknames,
) -> Result<TemplateGroup, XmlError> {
    let annotation = take_annotation(&mut tokens)?;

    let kind = match tokens.get(1).map(|t| t.kind) {
        Some(TokenKind::For) => GroupKind::For,
        Some(TokenKind::If) => GroupKind::If,
        Some(TokenKind::Insert) => GroupKind::Insert,
        Some(TokenKind::Rewrite) => GroupKind::Rewrite,
        Some(TokenKind::End) => GroupKind::End,
        Some(TokenKind::Do) => GroupKind::Do,
        _ => GroupKind::Placeholder,
    };

    if let Some(at) = &annotation {
        if !kind.is_opener() {
            return Err(XmlError::malformed(
                "Expansion targets may only annotate 'for', 'if', 'insert' or 'rewrite' groups.",
                at.span,
                format!("@{}", at.lexeme),
            ));
        }
    }

    let (expansion_target, expansion_direction, requires_partner) = match kind {
        GroupKind::For | GroupKind::If | GroupKind::Insert | GroupKind::Rewrite => {
            let target = annotation.map_or(ExpansionTarget::Auto, |at| {
                ExpansionTarget::Tag(nicknames.resolve(&at.lexeme).to_owned())
            });
            (target, ExpansionDirection::Left, true)
        }
        GroupKind::End => (ExpansionTarget::Auto, ExpansionDirection::Right, true),
        GroupKind::Do => (ExpansionTarget::Outermost, ExpansionDirection::Left, false),
        GroupKind::Placeholder => (ExpansionTarget::None, ExpansionDirection::Both, false),
    };

    Ok(TemplateGroup {
        tokens,
        kind,
        span,
        expansion_target,
        expansion_direction,
        requires_partner,
        partner: None,
    })
}

/// Remove the `@name` token, which must directly precede the closing
/// delimiter.
fn take_annotation(tokens: &mut Vec<Token>) -> Result<Option<Token>, XmlError> {
    let mut positions = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.kind == TokenKind::At)
        .map(|(i, _)| i);
    let Some(first) = positions.next() else {
        return Ok(None);
    };
    if let Some(second) = positions.next() {
        let token = &tokens[second];
        return Err(XmlError::malformed(
            "A group may carry only one expansion target.",
            token.span,
            format!("@{}", token.lexeme),
        ));
    }
    if first + 2 != tokens.len() {
        let token = &tokens[first];
        return Err(XmlError::malformed(
            "An expansion target must be the last element of its group.",
            token.span,
            format!("@{}", token.lexeme),
        ));
    }
    Ok(Some(tokens.remove(first)))
}
