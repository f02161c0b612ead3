//! Rewrite URL references in CSS.
//!
//! Every `url(...)` in a declaration and every `@import` target is handed to
//! a caller-supplied transform, together with enough context to decide the
//! replacement: where the stylesheet lives and what kind of URL it is.
//!
//! ```no_run
//! use camino::Utf8Path;
//! use rewrite_css::CssRewriter;
//!
//! let rewriter = CssRewriter::builder()
//!     .transform(|url, cx| {
//!         if cx.is_relative_url && !cx.is_relative_to_base {
//!             Ok(format!("/static/{url}"))
//!         } else {
//!             Ok(url.to_string())
//!         }
//!     })
//!     .build()?;
//!
//! let css = rewriter.rewrite(
//!     ".hero { background: url('hero.jpg') }",
//!     Utf8Path::new("css/site.css"),
//! )?;
//! assert!(css.contains(r#"url("/static/hero.jpg")"#));
//! # Ok::<(), rewrite_css::Error>(())
//! ```
//!
//! Parsing and printing go through lightningcss, so unrelated text comes back
//! in its normalized form. Rewritten declaration URLs print as `url("...")`,
//! and imports always print as `@import url("...")`.

pub mod classify;
pub mod context;
pub mod error;
pub mod extract;
pub mod options;
pub mod pipeline;
pub mod rewriter;
mod serialize;

pub use classify::{Classification, classify, is_relative_to_base, is_relative_url};
pub use context::{RewriteContext, Transform};
pub use error::{BoxError, Error};
pub use options::RewriteOptions;
pub use pipeline::{Contents, SourceFile};
pub use rewriter::{CssRewriter, CssRewriterBuilder};
