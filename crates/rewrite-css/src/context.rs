//! The boundary between the rewriter and caller logic.

use camino::Utf8Path;

use crate::classify::Classification;
use crate::error::BoxError;

/// Everything a transform gets to know about one URL reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteContext<'a> {
    /// Directory portion of the source file's path (`.` for a bare file name).
    pub source_dir: &'a Utf8Path,
    /// Full path of the source file.
    pub source_file: &'a Utf8Path,
    /// No scheme and no host.
    pub is_relative_url: bool,
    /// Starts with `/`.
    pub is_relative_to_base: bool,
    /// Found in an `@import` rule rather than a declaration.
    pub is_import_url: bool,
}

impl<'a> RewriteContext<'a> {
    pub(crate) fn new(
        source_file: &'a Utf8Path,
        classification: Classification,
        is_import_url: bool,
    ) -> Self {
        Self {
            source_dir: source_dir(source_file),
            source_file,
            is_relative_url: classification.is_relative_url,
            is_relative_to_base: classification.is_relative_to_base,
            is_import_url,
        }
    }
}

/// Directory containing `path`, `.` when it has no directory component.
pub fn source_dir(path: &Utf8Path) -> &Utf8Path {
    match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        Some(_) => Utf8Path::new("."),
        None => path,
    }
}

/// Computes the replacement for a candidate URL.
///
/// Implementations must be synchronous and must not depend on being called
/// in any particular order for correctness. Everything about how paths are
/// interpreted is up to the implementation; the rewriter only re-wraps the
/// returned string.
pub trait Transform: Send + Sync {
    fn transform(&self, candidate: &str, cx: &RewriteContext<'_>) -> Result<String, BoxError>;
}

impl<F> Transform for F
where
    F: Fn(&str, &RewriteContext<'_>) -> Result<String, BoxError> + Send + Sync,
{
    fn transform(&self, candidate: &str, cx: &RewriteContext<'_>) -> Result<String, BoxError> {
        self(candidate, cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_dir() {
        assert_eq!(
            source_dir(Utf8Path::new("/project/src/a.css")),
            Utf8Path::new("/project/src")
        );
        assert_eq!(source_dir(Utf8Path::new("a.css")), Utf8Path::new("."));
        assert_eq!(source_dir(Utf8Path::new("/a.css")), Utf8Path::new("/"));
        assert_eq!(source_dir(Utf8Path::new("/")), Utf8Path::new("/"));
    }

    #[test]
    fn test_context_carries_flags() {
        let file = Utf8Path::new("css/site.css");
        let cx = RewriteContext::new(
            file,
            Classification {
                is_relative_url: true,
                is_relative_to_base: false,
            },
            true,
        );
        assert_eq!(cx.source_dir, Utf8Path::new("css"));
        assert_eq!(cx.source_file, file);
        assert!(cx.is_relative_url);
        assert!(!cx.is_relative_to_base);
        assert!(cx.is_import_url);
    }
}
