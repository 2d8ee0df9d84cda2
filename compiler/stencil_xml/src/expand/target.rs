//! Expansion-target resolution for control pairs.

use rustc_hash::FxHashSet;
use stencil_ir::{ExpansionTarget, GroupId, GroupKind, GroupTable, TokenKind, XmlInputToken};

use super::{position, Expander};
use crate::XmlError;

/// Decide where a pair should expand to.
///
/// An explicit target always wins. Otherwise an `insert`/`rewrite` whose
/// rewriter is a function with a registered default takes that default;
/// then the last rule matching the tags between the pair applies; then an
/// `insert` falls back to the raw-XML expansion tag. Anything left stays put.
pub(super) fn resolve_target(
    expander: &Expander,
    tokens: &[XmlInputToken],
    groups: &GroupTable,
    opener: GroupId,
    closer: GroupId,
) -> Result<ExpansionTarget, XmlError> {
    let group = groups.get(opener);
    if group.expansion_target != ExpansionTarget::Auto {
        return Ok(group.expansion_target.clone());
    }

    let rewriting = matches!(group.kind, GroupKind::Insert | GroupKind::Rewrite);
    if rewriting {
        let callee = group
            .tokens
            .get(2)
            .filter(|t| t.kind == TokenKind::Identifier);
        if let Some(target) = callee.and_then(|t| expander.rewrite_defaults.get(&t.lexeme)) {
            return Ok(target.clone());
        }
    }

    let start = position(tokens, groups, opener)?;
    let end = position(tokens, groups, closer)?;
    let between: FxHashSet<&str> = tokens[start + 1..end]
        .iter()
        .filter_map(|t| t.as_raw().and_then(|raw| raw.tag()).map(|(name, _)| name))
        .collect();

    if let Some(rule) = expander
        .rules
        .iter()
        .rev()
        .find(|rule| rule.matches(|tag| between.contains(tag)))
    {
        return Ok(ExpansionTarget::Tag(rule.expand.clone()));
    }

    if group.kind == GroupKind::Insert {
        if let Some(tag) = &expander.default_raw_xml_tag {
            return Ok(ExpansionTarget::Tag(tag.clone()));
        }
    }
    Ok(ExpansionTarget::None)
}
