// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end template tests.
//!
//! Each case compiles a WordprocessingML fragment with the docx configuration
//! and renders it, so the whole pipeline runs: tokenizing, group extraction,
//! expansion, parsing, evaluation, repair and serialization.
//!
//! # Organization
//!
//! - `render/` - Expressions, statements and builtins seen through a document
//! - `layout/` - Group relocation, raw XML insertion and structural repair
//! - `errors/` - Error kinds and locations reported to callers
//! - `properties/` - Property-based checks (proptest)
//! - `common/` - Shared helpers
//!
//! ```bash
//! cargo test -p stencil --test phases
//! cargo test -p stencil --test phases layout
//! ```

#[path = "phases/common/mod.rs"]
mod common;

#[path = "phases/render/mod.rs"]
mod render;

#[path = "phases/layout/mod.rs"]
mod layout;

#[path = "phases/errors/mod.rs"]
mod errors;

#[path = "phases/properties/mod.rs"]
mod properties;
