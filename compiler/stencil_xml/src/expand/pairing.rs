//! Opener/closer pairing.

use stencil_ir::{GroupId, GroupTable, XmlInputToken};
use tracing::trace;

use crate::XmlError;

/// Link every `for`/`if`/`insert`/`rewrite` group with its `end`.
///
/// A stack of open groups is kept while scanning left to right; an `end`
/// closes the most recent one. An `end` with nothing open, or an opener that
/// is still open at the end of the document, fails.
pub fn pair_groups(tokens: &[XmlInputToken], groups: &mut GroupTable) -> Result<(), XmlError> {
    let mut open: Vec<GroupId> = Vec::new();
    for id in tokens.iter().filter_map(XmlInputToken::as_group) {
        let kind = groups.get(id).kind;
        if kind.is_opener() {
            open.push(id);
        } else if kind.is_closer() {
            let Some(opener) = open.pop() else {
                let group = groups.get(id);
                return Err(XmlError::structure(
                    "Found 'end' without a matching opening group.",
                    group.span,
                    group.head().map_or("end", |t| t.lexeme.as_str()),
                ));
            };
            groups.link(opener, id);
            trace!(?opener, closer = ?id, "paired template groups");
        }
    }

    if let Some(opener) = open.pop() {
        let group = groups.get(opener);
        let keyword = group.head().map_or("", |t| t.lexeme.as_str());
        return Err(XmlError::structure(
            format!("Missing 'end' for this '{keyword}' group."),
            group.span,
            keyword,
        ));
    }
    Ok(())
}
