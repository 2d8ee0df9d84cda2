//! Control-group expansion.
//!
//! A `{for}` typed inside a table cell should repeat the whole row, not the
//! text run it happens to sit in. After pairing, each opener/closer pair is
//! given a target element (explicit `@tag`, a rewriter default, the
//! expansion rules, or nothing) and both ends are moved outward until they
//! sit just outside that element. Pairs are processed in document order, so
//! outer pairs settle before the pairs nested inside them.

mod movement;
mod pairing;
mod target;

use rustc_hash::FxHashMap;
use stencil_ir::{ExpansionTarget, GroupId, GroupKind, GroupTable, XmlInputToken};
use tracing::debug;

use crate::{ExpansionRule, XmlError};

pub use pairing::pair_groups;

/// Expansion settings for one file type.
#[derive(Clone, Debug, Default)]
pub struct Expander {
    rules: Vec<ExpansionRule>,
    default_raw_xml_tag: Option<String>,
    rewrite_defaults: FxHashMap<String, ExpansionTarget>,
}

impl Expander {
    pub fn new(rules: Vec<ExpansionRule>) -> Self {
        Expander {
            rules,
            ..Self::default()
        }
    }

    /// Target for `insert` pairs that no rule matches.
    #[must_use]
    pub fn with_default_raw_xml_tag(mut self, tag: impl Into<String>) -> Self {
        self.default_raw_xml_tag = Some(tag.into());
        self
    }

    /// Target for `insert`/`rewrite` pairs whose rewriter is the global
    /// function `name`.
    #[must_use]
    pub fn with_rewrite_default(mut self, name: impl Into<String>, target: ExpansionTarget) -> Self {
        self.rewrite_defaults.insert(name.into(), target);
        self
    }

    /// Pair the groups in `tokens`, resolve targets and relocate them.
    ///
    /// Resolved targets are written back into `groups` for both members of
    /// every pair.
    #[tracing::instrument(level = "debug", skip_all, fields(groups = groups.len()))]
    pub fn expand(
        &self,
        mut tokens: Vec<XmlInputToken>,
        groups: &mut GroupTable,
    ) -> Result<Vec<XmlInputToken>, XmlError> {
        pair_groups(&tokens, groups)?;

        let order: Vec<GroupId> = tokens.iter().filter_map(XmlInputToken::as_group).collect();
        for id in order {
            match groups.get(id).kind {
                GroupKind::Do => {
                    let (from, to) = movement::move_left(&mut tokens, groups, id, None)?;
                    debug!(group = ?id, from, to, "moved 'do' group");
                }
                kind if kind.is_opener() => self.expand_pair(&mut tokens, groups, id)?,
                _ => {}
            }
        }
        Ok(tokens)
    }

    fn expand_pair(
        &self,
        tokens: &mut Vec<XmlInputToken>,
        groups: &mut GroupTable,
        opener: GroupId,
    ) -> Result<(), XmlError> {
        let Some(closer) = groups.partner(opener) else {
            let group = groups.get(opener);
            return Err(XmlError::structure(
                "Control group was not paired before expansion.",
                group.span,
                group.head().map_or("", |t| t.lexeme.as_str()),
            ));
        };

        let target = target::resolve_target(self, tokens, groups, opener, closer)?;
        groups.get_mut(opener).expansion_target = target.clone();
        groups.get_mut(closer).expansion_target = target.clone();

        let tag = match &target {
            ExpansionTarget::Tag(tag) => Some(tag.as_str()),
            ExpansionTarget::Outermost => None,
            ExpansionTarget::None | ExpansionTarget::Auto => return Ok(()),
        };
        let (from, to) = movement::move_left(tokens, groups, opener, tag)?;
        debug!(group = ?opener, %target, from, to, "moved opening group");
        let (from, to) = movement::move_right(tokens, groups, closer, tag)?;
        debug!(group = ?closer, %target, from, to, "moved closing group");
        Ok(())
    }
}

/// Index of the token for `id`.
fn position(tokens: &[XmlInputToken], groups: &GroupTable, id: GroupId) -> Result<usize, XmlError> {
    tokens
        .iter()
        .position(|t| t.as_group() == Some(id))
        .ok_or_else(|| {
            let group = groups.get(id);
            XmlError::structure(
                "Template group is missing from the token stream.",
                group.span,
                group.head().map_or("", |t| t.lexeme.as_str()),
            )
        })
}
