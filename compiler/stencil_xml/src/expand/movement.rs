//! Group relocation.
//!
//! An opener walks left and a closer walks right, tracking element depth so
//! that only *enclosing* elements are left behind. Complete siblings (whole
//! elements, placeholders, nested pairs that are already balanced) are
//! stepped over. With no target tag the walk stops at the first group it
//! meets or at the document edge.

use stencil_ir::{GroupId, GroupTable, TagPartType, TemplateGroup, XmlInputToken};

use super::position;
use crate::XmlError;

/// Move `id` left until it sits just before an enclosing `<target>`.
pub(super) fn move_left(
    tokens: &mut Vec<XmlInputToken>,
    groups: &GroupTable,
    id: GroupId,
    target: Option<&str>,
) -> Result<(usize, usize), XmlError> {
    let from = position(tokens, groups, id)?;
    let token = tokens.remove(from);
    let mut at = from;
    let mut depth = 0u32;
    let mut reached = false;

    while at > 0 {
        match &tokens[at - 1] {
            XmlInputToken::Raw(raw) => match raw.tag() {
                Some((_, TagPartType::Closing)) => depth += 1,
                Some((_, TagPartType::Opening)) if depth > 0 => depth -= 1,
                Some((name, TagPartType::Opening)) if target == Some(name) => {
                    at -= 1;
                    reached = true;
                    break;
                }
                _ => {}
            },
            XmlInputToken::Sentinel => {}
            XmlInputToken::Group(other) => {
                let other = groups.get(*other);
                if target.is_none() || other.kind.is_opener() {
                    break;
                }
                if let Some(partner) = other.partner.filter(|_| other.kind.is_closer()) {
                    let start = position(tokens, groups, partner)?;
                    depth = balance(tokens[start..at].iter().rev(), depth, TagPartType::Opening)
                        .ok_or_else(|| straddling(groups.get(id)))?;
                    at = start;
                    continue;
                }
            }
        }
        at -= 1;
    }

    if let (false, Some(target)) = (reached, target) {
        if at == 0 {
            return Err(cannot_expand(groups.get(id), target));
        }
    }
    tokens.insert(at, token);
    Ok((from, at))
}

/// Move `id` right until it sits just after an enclosing `</target>`.
pub(super) fn move_right(
    tokens: &mut Vec<XmlInputToken>,
    groups: &GroupTable,
    id: GroupId,
    target: Option<&str>,
) -> Result<(usize, usize), XmlError> {
    let from = position(tokens, groups, id)?;
    let token = tokens.remove(from);
    let mut at = from;
    let mut depth = 0u32;
    let mut reached = false;

    while at < tokens.len() {
        match &tokens[at] {
            XmlInputToken::Raw(raw) => match raw.tag() {
                Some((_, TagPartType::Opening)) => depth += 1,
                Some((_, TagPartType::Closing)) if depth > 0 => depth -= 1,
                Some((name, TagPartType::Closing)) if target == Some(name) => {
                    at += 1;
                    reached = true;
                    break;
                }
                _ => {}
            },
            XmlInputToken::Sentinel => {}
            XmlInputToken::Group(other) => {
                let other = groups.get(*other);
                if target.is_none() || other.kind.is_closer() {
                    break;
                }
                if let Some(partner) = other.partner.filter(|_| other.kind.is_opener()) {
                    let end = position(tokens, groups, partner)?;
                    depth = balance(tokens[at..=end].iter(), depth, TagPartType::Closing)
                        .ok_or_else(|| straddling(groups.get(id)))?;
                    at = end + 1;
                    continue;
                }
            }
        }
        at += 1;
    }

    if let (false, Some(target)) = (reached, target) {
        if at == tokens.len() {
            return Err(cannot_expand(groups.get(id), target));
        }
    }
    tokens.insert(at, token);
    Ok((from, at))
}

/// Depth after walking over a sibling pair, or `None` if the pair leaves
/// an element that encloses the moving group (`outward` at depth zero).
fn balance<'a>(
    walk: impl Iterator<Item = &'a XmlInputToken>,
    mut depth: u32,
    outward: TagPartType,
) -> Option<u32> {
    for token in walk {
        let Some((_, part)) = token.as_raw().and_then(|raw| raw.tag()) else {
            continue;
        };
        if part == TagPartType::SelfClosing {
            continue;
        }
        if part == outward {
            depth = depth.checked_sub(1)?;
        } else {
            depth += 1;
        }
    }
    Some(depth)
}

fn keyword(group: &TemplateGroup) -> &str {
    group.head().map_or("", |t| t.lexeme.as_str())
}

fn cannot_expand(group: &TemplateGroup, target: &str) -> XmlError {
    let keyword = keyword(group);
    XmlError::structure(
        format!("Cannot expand '{keyword}' group further: no enclosing <{target}> element."),
        group.span,
        keyword,
    )
}

fn straddling(group: &TemplateGroup) -> XmlError {
    let keyword = keyword(group);
    XmlError::structure(
        format!("Cannot expand '{keyword}' group across a sibling group pair that spans its enclosing element."),
        group.span,
        keyword,
    )
}
