//! Per-file-type settings.
//!
//! A [`FileTypeConfig`] tells the pipeline which elements hold text, how
//! control groups expand through the markup, and which structural rules the
//! rendered output must satisfy.

use stencil_eval::LineBreaks;
use stencil_ir::ExpansionTarget;
use stencil_xml::{ExpansionRule, Expander, TagNicknames};

use crate::repair::{RepairAction, RepairRule};

#[derive(Clone, Debug, Default)]
pub struct FileTypeConfig {
    /// Elements whose character data may contain template groups.
    pub text_tags: Vec<String>,
    pub nicknames: TagNicknames,
    /// Later rules take precedence over earlier ones.
    pub expansion_rules: Vec<ExpansionRule>,
    /// Where an `insert` with no other target expands to.
    pub default_raw_xml_tag: Option<String>,
    /// Expansion target keyed by the rewriter function an `insert` or
    /// `rewrite` names, e.g. `$rawXml`.
    pub rewrite_defaults: Vec<(String, ExpansionTarget)>,
    pub repair_rules: Vec<RepairRule>,
    /// Markup `$lineBreaksToTags` puts in place of a newline.
    pub line_breaks: Option<LineBreaks>,
}

impl FileTypeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// WordprocessingML (`.docx`) defaults.
    pub fn docx() -> Self {
        FileTypeConfig::new()
            .with_text_tags([
                "w:t",
                "a:t",
                "m:t",
                "Company",
                "HyperlinkBase",
                "Manager",
                "cp:category",
                "cp:keywords",
                "cp:contentStatus",
                "dc:creator",
                "dc:description",
                "dc:subject",
                "dc:title",
                "vt:lpstr",
                "vt:lpwstr",
            ])
            .with_nickname("inline", "w:r")
            .with_nickname("block", "w:p")
            .with_expansion_rule(ExpansionRule::new("w:tc", "w:tr").excluding("w:tbl"))
            .with_default_raw_xml_tag("w:p")
            .with_rewrite_default("$rawXml", ExpansionTarget::Tag("w:p".to_owned()))
            .with_line_breaks(LineBreaks::new("w:br", ["w:t"]))
            .with_repair_rule(RepairRule::new(
                "w:sdtContent",
                ["w:p", "w:r", "w:commentRangeStart", "w:sdt"],
                RepairAction::Insert("<w:p></w:p>".to_owned()),
            ))
            .with_repair_rule(RepairRule::new(
                "w:tc",
                ["w:p"],
                RepairAction::Insert("<w:p></w:p>".to_owned()),
            ))
            .with_repair_rule(RepairRule::new("w:tr", ["w:tc"], RepairAction::Drop))
            .with_repair_rule(RepairRule::new("w:tbl", ["w:tr"], RepairAction::Drop))
    }

    #[must_use]
    pub fn with_text_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text_tags.extend(tags.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn with_nickname(mut self, nickname: impl Into<String>, tag: impl Into<String>) -> Self {
        self.nicknames = self.nicknames.with(nickname, tag);
        self
    }

    #[must_use]
    pub fn with_expansion_rule(mut self, rule: ExpansionRule) -> Self {
        self.expansion_rules.push(rule);
        self
    }

    #[must_use]
    pub fn with_default_raw_xml_tag(mut self, tag: impl Into<String>) -> Self {
        self.default_raw_xml_tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn with_rewrite_default(mut self, function: impl Into<String>, target: ExpansionTarget) -> Self {
        self.rewrite_defaults.push((function.into(), target));
        self
    }

    #[must_use]
    pub fn with_line_breaks(mut self, line_breaks: LineBreaks) -> Self {
        self.line_breaks = Some(line_breaks);
        self
    }

    #[must_use]
    pub fn with_repair_rule(mut self, rule: RepairRule) -> Self {
        self.repair_rules.push(rule);
        self
    }

    /// Expansion engine configured for this file type.
    pub fn expander(&self) -> Expander {
        let mut expander = Expander::new(self.expansion_rules.clone());
        if let Some(tag) = &self.default_raw_xml_tag {
            expander = expander.with_default_raw_xml_tag(tag.as_str());
        }
        for (function, target) in &self.rewrite_defaults {
            expander = expander.with_rewrite_default(function.as_str(), target.clone());
        }
        expander
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_docx_defaults() {
        let config = FileTypeConfig::docx();
        assert_eq!(config.text_tags[0], "w:t");
        assert_eq!(config.nicknames.resolve("inline"), "w:r");
        assert_eq!(config.nicknames.resolve("block"), "w:p");
        assert_eq!(config.nicknames.resolve("w:tbl"), "w:tbl");
        assert_eq!(config.default_raw_xml_tag.as_deref(), Some("w:p"));
        assert_eq!(config.expansion_rules.len(), 1);
        assert_eq!(
            config.line_breaks.as_ref().map(LineBreaks::markup).as_deref(),
            Some("</w:t><w:br/><w:t>")
        );
        let tags: Vec<&str> = config.repair_rules.iter().map(|r| r.tag.as_str()).collect();
        assert_eq!(tags, ["w:sdtContent", "w:tc", "w:tr", "w:tbl"]);
    }

    #[test]
    fn test_builders_append() {
        let config = FileTypeConfig::new()
            .with_text_tags(["t"])
            .with_text_tags(vec!["u".to_owned()])
            .with_expansion_rule(ExpansionRule::new("cell", "row"));
        assert_eq!(config.text_tags, ["t", "u"]);
        assert_eq!(config.expansion_rules[0].expand, "row");
        assert!(config.repair_rules.is_empty());
    }
}
