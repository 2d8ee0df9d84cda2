//! Expansion rules and tag nicknames.

use rustc_hash::FxHashMap;

/// "When a control pair spans a `contains` element (and no `not_contains`
/// element), move it outside the nearest enclosing `expand` element."
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpansionRule {
    pub contains: String,
    pub not_contains: Option<String>,
    pub expand: String,
}

impl ExpansionRule {
    pub fn new(contains: impl Into<String>, expand: impl Into<String>) -> Self {
        ExpansionRule {
            contains: contains.into(),
            not_contains: None,
            expand: expand.into(),
        }
    }

    #[must_use]
    pub fn excluding(mut self, tag: impl Into<String>) -> Self {
        self.not_contains = Some(tag.into());
        self
    }

    /// Whether this rule fires for a pair spanning `has_tag` elements.
    pub fn matches(&self, has_tag: impl Fn(&str) -> bool) -> bool {
        has_tag(&self.contains) && !self.not_contains.as_deref().is_some_and(&has_tag)
    }
}

/// Short aliases usable in `@name` annotations, e.g. `@block` for `w:p`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagNicknames {
    map: FxHashMap<String, String>,
}

impl TagNicknames {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, nickname: impl Into<String>, tag: impl Into<String>) -> Self {
        self.map.insert(nickname.into(), tag.into());
        self
    }

    /// The tag a nickname stands for; unknown names are taken literally.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.map.get(name).map_or(name, String::as_str)
    }
}
