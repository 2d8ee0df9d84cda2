//! Compiled templates.

use stencil_diagnostic::TemplateError;
use stencil_eval::{RenderOptions, RenderPool};
use stencil_ir::{serialize, Program, XmlOutputToken};
use stencil_xml::{extract_groups, tokenize};
use tracing::debug;

use crate::repair::{repair, RepairRule};
use crate::{Data, FileTypeConfig, TemplateOptions};

/// A document parsed once and rendered any number of times.
///
/// Compilation does everything that does not depend on data: tokenizing the
/// XML, lifting out template groups, relocating control groups and parsing.
/// A `Template` is immutable and can be shared across threads; each render
/// builds its own global scope. With parallel loops enabled the worker pool
/// is started here and shared by every render and every clone.
#[derive(Clone, Debug)]
pub struct Template {
    program: Program,
    repair_rules: Vec<RepairRule>,
    options: TemplateOptions,
    render_options: RenderOptions,
    pool: Option<RenderPool>,
}

impl Template {
    #[tracing::instrument(level = "debug", skip_all, fields(bytes = xml.len()))]
    pub fn compile(
        xml: &str,
        config: &FileTypeConfig,
        options: TemplateOptions,
    ) -> Result<Self, TemplateError> {
        let raw = tokenize(xml, &config.text_tags)?;
        let mut doc = extract_groups(raw, &options.delimiters, &config.nicknames)?;
        let tokens = config.expander().expand(doc.tokens, &mut doc.groups)?;
        let program = stencil_parse::parse(&tokens, &doc.groups)?;
        debug!(
            groups = doc.groups.len(),
            stmts = program.stmts.len(),
            "compiled template"
        );
        let render_options = RenderOptions {
            line_breaks: config.line_breaks.clone(),
            ..options.render_options()
        };
        let pool = RenderPool::for_options(&render_options);
        Ok(Template {
            program,
            repair_rules: config.repair_rules.clone(),
            options,
            render_options,
            pool,
        })
    }

    /// Render to XML text, applying structural repair when enabled.
    pub fn render(&self, data: &Data) -> Result<String, TemplateError> {
        let tokens = self.render_tokens(data)?;
        let tokens = if self.options.repair {
            repair(tokens, &self.repair_rules)
        } else {
            tokens
        };
        Ok(serialize(&tokens))
    }

    /// The interpreter's output before repair and serialization.
    pub fn render_tokens(&self, data: &Data) -> Result<Vec<XmlOutputToken>, TemplateError> {
        stencil_eval::render_program(
            &self.program,
            data.values(),
            data.registry(),
            &self.render_options,
            self.pool.as_ref(),
        )
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn options(&self) -> &TemplateOptions {
        &self.options
    }

    /// Worker pool for parallel loops, if enabled.
    pub fn pool(&self) -> Option<&RenderPool> {
        self.pool.as_ref()
    }
}
