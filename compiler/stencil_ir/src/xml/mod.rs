//! XML token model.
//!
//! The document is a flat stream of [`XmlInputToken`]s: raw XML pieces, the
//! template groups embedded in text content, and sentinels. Groups are stored
//! once in a [`GroupTable`] and referenced by [`GroupId`]; the opener/closer
//! `partner` relation is a pair of ids, which keeps the cyclic link out of the
//! ownership graph.

use std::fmt;

use crate::{Span, Token};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TagPartType {
    Opening,
    Closing,
    SelfClosing,
}

/// A lexical piece of the source XML. Concatenating the `xml()` of every
/// raw token reproduces the input byte-for-byte.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlRawToken {
    /// `<w:p ...>`, `</w:p>` or `<w:br/>`.
    TagPart {
        name: String,
        offset: u32,
        raw: String,
        part: TagPartType,
        is_text_tag: bool,
    },
    /// Character data, still XML-escaped exactly as it appeared.
    Content {
        offset: u32,
        text: String,
        inside_text_tag: bool,
    },
    /// Declarations, comments, CDATA and processing instructions.
    Verbatim { offset: u32, text: String },
}

impl XmlRawToken {
    /// Source text of this token.
    pub fn xml(&self) -> &str {
        match self {
            XmlRawToken::TagPart { raw, .. } => raw,
            XmlRawToken::Content { text, .. } | XmlRawToken::Verbatim { text, .. } => text,
        }
    }

    pub fn offset(&self) -> u32 {
        match self {
            XmlRawToken::TagPart { offset, .. }
            | XmlRawToken::Content { offset, .. }
            | XmlRawToken::Verbatim { offset, .. } => *offset,
        }
    }

    /// Tag name and part type, if this is a tag.
    pub fn tag(&self) -> Option<(&str, TagPartType)> {
        match self {
            XmlRawToken::TagPart { name, part, .. } => Some((name, *part)),
            _ => None,
        }
    }
}

/// Where an expanded group should end up.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ExpansionTarget {
    /// Resolved; stay in place.
    None,
    /// Compute from expansion rules.
    #[default]
    Auto,
    /// Move just outside the nearest enclosing element with this name.
    Tag(String),
    /// Move as far as structurally possible.
    Outermost,
}

impl fmt::Display for ExpansionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpansionTarget::None => f.write_str("none"),
            ExpansionTarget::Auto => f.write_str("auto"),
            ExpansionTarget::Tag(name) => write!(f, "<{name}>"),
            ExpansionTarget::Outermost => f.write_str("outermost"),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExpansionDirection {
    Left,
    Right,
    Both,
}

/// What a template group does, decided from its leading keyword.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum GroupKind {
    For,
    If,
    Insert,
    Rewrite,
    End,
    Do,
    /// Anything else: interpolation or `var`.
    Placeholder,
}

impl GroupKind {
    pub fn is_opener(self) -> bool {
        matches!(
            self,
            GroupKind::For | GroupKind::If | GroupKind::Insert | GroupKind::Rewrite
        )
    }

    pub fn is_closer(self) -> bool {
        self == GroupKind::End
    }
}

/// Handle into a [`GroupTable`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(u32);

impl GroupId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        GroupId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A template construct embedded in document text, e.g. `{for x in xs}`.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateGroup {
    /// Scanned tokens, delimiters included, annotation removed.
    pub tokens: Vec<Token>,
    pub kind: GroupKind,
    /// Location of the group source in the document.
    pub span: Span,
    pub expansion_target: ExpansionTarget,
    pub expansion_direction: ExpansionDirection,
    pub requires_partner: bool,
    pub partner: Option<GroupId>,
}

impl TemplateGroup {
    /// Leading token after the opening delimiter, used for error messages.
    pub fn head(&self) -> Option<&Token> {
        self.tokens.get(1).or_else(|| self.tokens.first())
    }
}

/// Flat storage for the template groups of one document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupTable {
    groups: Vec<TemplateGroup>,
}

impl GroupTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, group: TemplateGroup) -> GroupId {
        let id = GroupId::new(u32::try_from(self.groups.len()).unwrap_or(u32::MAX));
        self.groups.push(group);
        id
    }

    /// Ids are only minted by [`GroupTable::push`] on the same table.
    #[inline]
    pub fn get(&self, id: GroupId) -> &TemplateGroup {
        &self.groups[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: GroupId) -> &mut TemplateGroup {
        &mut self.groups[id.index()]
    }

    /// Record `a` and `b` as each other's partner.
    pub fn link(&mut self, a: GroupId, b: GroupId) {
        self.get_mut(a).partner = Some(b);
        self.get_mut(b).partner = Some(a);
    }

    pub fn partner(&self, id: GroupId) -> Option<GroupId> {
        self.get(id).partner
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (GroupId, &TemplateGroup)> {
        self.groups
            .iter()
            .enumerate()
            .map(|(i, g)| (GroupId::new(i as u32), g))
    }
}

/// One element of the document token stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlInputToken {
    Raw(XmlRawToken),
    Group(GroupId),
    /// Splice point with no XML of its own.
    Sentinel,
}

impl XmlInputToken {
    pub fn as_group(&self) -> Option<GroupId> {
        match self {
            XmlInputToken::Group(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_raw(&self) -> Option<&XmlRawToken> {
        match self {
            XmlInputToken::Raw(raw) => Some(raw),
            _ => None,
        }
    }
}
