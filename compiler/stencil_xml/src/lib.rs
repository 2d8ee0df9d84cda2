//! XML front end of the template engine.
//!
//! Three stages turn a document into the token stream the parser consumes:
//!
//! 1. [`tokenize`] splits the XML into raw tag, content and verbatim pieces
//!    without normalizing a single byte.
//! 2. [`extract_groups`] lifts delimited template groups out of text content,
//!    scans them, and classifies each one into a [`TemplateGroup`].
//! 3. [`Expander`] pairs openers with their `end`, resolves expansion
//!    targets, and relocates control groups so that a loop or condition
//!    wraps whole structural elements (rows, paragraphs) rather than the
//!    text run it was typed into.
//!
//! [`TemplateGroup`]: stencil_ir::TemplateGroup

mod error;
mod expand;
mod extract;
mod group;
mod rules;
mod tokenizer;

pub use error::XmlError;
pub use expand::{pair_groups, Expander};
pub use extract::{extract_groups, ExtractedDocument};
pub use group::classify;
pub use rules::{ExpansionRule, TagNicknames};
pub use tokenizer::tokenize;

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
