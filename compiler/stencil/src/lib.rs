//! Stencil: Office document templating.
//!
//! Placeholders and control blocks are typed straight into a document, e.g.
//! `{for row in rows}` in the first cell of a table row and `{end}` in the
//! last. [`Template::compile`] lifts them out of the XML, moves each control
//! pair so it wraps whole elements, and parses the result. [`Template::render`]
//! evaluates the program against [`Data`] and serializes the output.
//!
//! ```text
//! let template = Template::compile(xml, &FileTypeConfig::docx(), TemplateOptions::default())?;
//! let out = template.render(&Data::new().with("name", "Ada"))?;
//! ```
//!
//! Package handling (unzipping `.docx` parts) is left to the caller; this
//! crate works on one XML part at a time.

mod config;
mod data;
mod options;
pub mod repair;
mod template;

use std::sync::Once;

pub use config::FileTypeConfig;
pub use data::Data;
pub use options::TemplateOptions;
pub use repair::{RepairAction, RepairRule};
pub use template::Template;

pub use stencil_diagnostic::{ErrorKind, LineOffsetTable, TemplateError};
pub use stencil_eval::{
    AccessorRegistry, FnRewriter, HostObject, IdentityRewriter, LineBreaks, NativeError,
    NumberSymbols, RawXmlRewriter, RenderPool, RewriteError, Value, ValueMap, XmlStreamRewriter,
};
pub use stencil_ir::{ExpansionTarget, XmlOutputToken};
pub use stencil_xml::{ExpansionRule, TagNicknames};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
/// Enable with `RUST_LOG=stencil=debug` or `RUST_LOG=stencil_xml=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
