//! Rewriter configuration.

use facet::Facet;

/// Options fixed when the rewriter is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Facet)]
#[facet(rename_all = "snake_case")]
pub struct RewriteOptions {
    /// Log every rewrite (original fragment, source file, replacement).
    #[facet(default)]
    pub debug: bool,

    /// Print the result with the minifying printer.
    /// Declaration URLs may come out unquoted when that is shorter.
    #[facet(default)]
    pub minify: bool,
}
