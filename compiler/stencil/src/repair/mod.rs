//! Structural repair of rendered output.
//!
//! Loops and conditionals can leave elements that the target schema does
//! not allow to be empty: a table cell whose paragraphs were all skipped, a
//! row whose cells were all dropped. One pass over the output tokens tracks
//! the open elements on a stack, and when an element governed by a
//! [`RepairRule`] closes without any of its required descendants, the rule's
//! action is applied.
//!
//! Because an element is judged when it closes, its children have already
//! been repaired; dropping every row of a table therefore also drops the
//! table.

use rustc_hash::FxHashSet;
use stencil_ir::{TagPartType, XmlOutputToken};
use tracing::{debug, trace};

/// What to do with an element that lacks its required content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RepairAction {
    /// Insert this XML right before the closing tag.
    Insert(String),
    /// Remove the element and everything inside it.
    Drop,
    /// Remove the nearest enclosing element with this name.
    DropWithParent(String),
}

/// "Every `tag` element must contain at least one of `should_contain`."
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepairRule {
    pub tag: String,
    pub should_contain: Vec<String>,
    pub action: RepairAction,
}

impl RepairRule {
    pub fn new<I, S>(tag: impl Into<String>, should_contain: I, action: RepairAction) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RepairRule {
            tag: tag.into(),
            should_contain: should_contain.into_iter().map(Into::into).collect(),
            action,
        }
    }
}

/// An element that has been opened but not yet closed.
struct Frame {
    name: String,
    /// Index in the output where the opening tag sits.
    start: usize,
    /// Names of every element seen inside so far.
    descendants: FxHashSet<String>,
    /// Set by a `DropWithParent` rule on a descendant.
    doomed: bool,
}

/// Apply `rules` to a rendered token stream.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
pub fn repair(tokens: Vec<XmlOutputToken>, rules: &[RepairRule]) -> Vec<XmlOutputToken> {
    if rules.is_empty() {
        return tokens;
    }

    let mut out = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Frame> = Vec::new();
    let mut repaired = 0usize;

    for token in tokens {
        let tag = match &token {
            XmlOutputToken::Raw(raw) => raw.tag().map(|(name, part)| (name.to_owned(), part)),
            XmlOutputToken::Content {
                text,
                escape: false,
            } => {
                if let Some(frame) = stack.last_mut() {
                    frame.descendants.extend(inline_tag_names(text));
                }
                None
            }
            _ => None,
        };
        let Some((name, part)) = tag else {
            out.push(token);
            continue;
        };

        match part {
            TagPartType::Opening => {
                stack.push(Frame {
                    name,
                    start: out.len(),
                    descendants: FxHashSet::default(),
                    doomed: false,
                });
                out.push(token);
            }
            TagPartType::SelfClosing => {
                if let Some(frame) = stack.last_mut() {
                    frame.descendants.insert(name);
                }
                out.push(token);
            }
            TagPartType::Closing => {
                if !matches!(stack.last(), Some(frame) if frame.name == name) {
                    trace!(tag = %name, "unbalanced closing tag left as is");
                    out.push(token);
                    continue;
                }
                let Some(mut frame) = stack.pop() else {
                    continue;
                };

                let action = if frame.doomed {
                    Some(RepairAction::Drop)
                } else {
                    violated_rule(rules, &frame).map(|rule| rule.action.clone())
                };
                match action {
                    None => {
                        out.push(token);
                        close_into_parent(&mut stack, frame);
                    }
                    Some(RepairAction::Insert(xml)) => {
                        repaired += 1;
                        frame.descendants.extend(inline_tag_names(&xml));
                        out.push(XmlOutputToken::raw_xml(xml));
                        out.push(token);
                        close_into_parent(&mut stack, frame);
                    }
                    Some(RepairAction::Drop) => {
                        repaired += 1;
                        out.truncate(frame.start);
                    }
                    Some(RepairAction::DropWithParent(parent)) => {
                        repaired += 1;
                        out.truncate(frame.start);
                        // With no such ancestor the element alone goes.
                        if let Some(ancestor) = stack.iter_mut().rev().find(|f| f.name == parent) {
                            ancestor.doomed = true;
                        }
                    }
                }
            }
        }
    }

    debug!(repaired, "structural repair");
    out
}

fn violated_rule<'r>(rules: &'r [RepairRule], frame: &Frame) -> Option<&'r RepairRule> {
    rules.iter().find(|rule| {
        rule.tag == frame.name
            && !rule
                .should_contain
                .iter()
                .any(|required| frame.descendants.contains(required))
    })
}

/// Record a surviving element and its contents in the enclosing frame.
fn close_into_parent(stack: &mut [Frame], frame: Frame) {
    if let Some(parent) = stack.last_mut() {
        parent.descendants.extend(frame.descendants);
        parent.descendants.insert(frame.name);
    }
}

/// Element names inside an unescaped XML fragment, e.g. the payload of
/// `$rawXml`. Fragments that do not tokenize contribute nothing.
fn inline_tag_names(xml: &str) -> Vec<String> {
    stencil_xml::tokenize(xml, &[])
        .map(|raw| {
            raw.iter()
                .filter_map(|t| t.tag().map(|(name, _)| name.to_owned()))
                .collect()
        })
        .unwrap_or_default()
}
