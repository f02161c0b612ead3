//! The rewriting engine: parse, walk the rules, call the transform, print.

use camino::Utf8Path;
use lightningcss::rules::CssRule;
use lightningcss::rules::import::ImportRule;
use lightningcss::stylesheet::{ParserOptions, StyleSheet};
use lightningcss::values::image::Image;
use lightningcss::values::url::Url;
use lightningcss::visit_types;
use lightningcss::visitor::{Visit, VisitTypes, Visitor};

use crate::classify::classify;
use crate::context::{RewriteContext, Transform};
use crate::error::{BoxError, Error};
use crate::extract::{self, find_declaration_url, find_import_url, wrap_url};
use crate::options::RewriteOptions;
use crate::serialize::print_stylesheet;

/// Rewrites `url()` references and `@import` targets in CSS text.
///
/// Built once with a transform, then used for any number of files. Holds no
/// per-file state, so a single rewriter can be shared freely.
pub struct CssRewriter {
    transform: Box<dyn Transform>,
    options: RewriteOptions,
}

impl std::fmt::Debug for CssRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CssRewriter")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Builder for [`CssRewriter`].
#[derive(Default)]
pub struct CssRewriterBuilder {
    transform: Option<Box<dyn Transform>>,
    options: RewriteOptions,
}

impl CssRewriterBuilder {
    /// Set the transform from a closure.
    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(&str, &RewriteContext<'_>) -> Result<String, BoxError> + Send + Sync + 'static,
    {
        self.transform = Some(Box::new(f));
        self
    }

    /// Set the transform from any [`Transform`] implementation.
    pub fn transformer(mut self, transform: impl Transform + 'static) -> Self {
        self.transform = Some(Box::new(transform));
        self
    }

    pub fn options(mut self, options: RewriteOptions) -> Self {
        self.options = options;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.options.debug = debug;
        self
    }

    /// Finish building. Fails if no transform was supplied.
    pub fn build(self) -> Result<CssRewriter, Error> {
        let transform = self.transform.ok_or_else(|| {
            Error::Configuration("required transform function missing".to_string())
        })?;
        Ok(CssRewriter {
            transform,
            options: self.options,
        })
    }
}

impl CssRewriter {
    pub fn builder() -> CssRewriterBuilder {
        CssRewriterBuilder::default()
    }

    pub fn options(&self) -> RewriteOptions {
        self.options
    }

    /// Rewrite every URL reference in `css`, which was read from `source_file`.
    ///
    /// Rules are processed top to bottom, so the transform sees URLs in
    /// document order. Any failure aborts the whole file.
    pub fn rewrite(&self, css: &str, source_file: &Utf8Path) -> Result<String, Error> {
        let parser_options = ParserOptions {
            filename: source_file.to_string(),
            ..ParserOptions::default()
        };
        let mut stylesheet =
            StyleSheet::parse(css, parser_options).map_err(|e| Error::Parse {
                path: source_file.to_owned(),
                message: e.to_string(),
            })?;

        let mut visitor = UrlRewriter {
            rewriter: self,
            source: css,
            source_file,
            depth: 0,
        };
        stylesheet.visit(&mut visitor)?;

        print_stylesheet(&stylesheet, self.options.minify).map_err(|e| Error::Serialize {
            path: source_file.to_owned(),
            message: e.to_string(),
        })
    }
}

/// How a top-level rule is handled.
enum Rule<'r, 'i> {
    /// Carries declarations: style rules, `@font-face`, `@page`.
    Declarations(&'r mut CssRule<'i>),
    Import(&'r mut ImportRule<'i>),
    /// Printed unchanged.
    Other,
}

impl<'r, 'i> From<&'r mut CssRule<'i>> for Rule<'r, 'i> {
    fn from(rule: &'r mut CssRule<'i>) -> Self {
        if matches!(
            rule,
            CssRule::Style(_) | CssRule::FontFace(_) | CssRule::Page(_)
        ) {
            return Rule::Declarations(rule);
        }
        match rule {
            CssRule::Import(import) => Rule::Import(import),
            _ => Rule::Other,
        }
    }
}

/// Visitor that hands each URL to the transform.
struct UrlRewriter<'a> {
    rewriter: &'a CssRewriter,
    source: &'a str,
    source_file: &'a Utf8Path,
    /// Rule nesting depth; only top-level rules are rewritten.
    depth: usize,
}

impl UrlRewriter<'_> {
    fn replace(&self, candidate: &str, is_import_url: bool, line: u32) -> Result<String, Error> {
        let cx = RewriteContext::new(self.source_file, classify(candidate), is_import_url);
        let replacement = self
            .rewriter
            .transform
            .transform(candidate, &cx)
            .map_err(|source| Error::Transform {
                path: self.source_file.to_owned(),
                url: candidate.to_string(),
                source,
            })?;

        if self.rewriter.options.debug {
            let fragment = self.original_fragment(candidate, is_import_url, line);
            tracing::info!(
                %fragment,
                source_file = %self.source_file,
                %replacement,
                "rewriting path"
            );
        }
        Ok(replacement)
    }

    /// Recover the text the candidate was written as, for debug output.
    fn original_fragment(&self, candidate: &str, is_import_url: bool, line: u32) -> String {
        let found = self.source.lines().nth(line as usize).and_then(|text| {
            if is_import_url {
                text.match_indices("@import").find_map(|(start, keyword)| {
                    find_import_url(&text[start + keyword.len()..])
                        .filter(|m| m.candidate == candidate)
                        .map(|m| m.fragment)
                })
            } else {
                let mut rest = text;
                while let Some(m) = find_declaration_url(rest) {
                    if m.candidate == candidate {
                        return Some(m.fragment);
                    }
                    rest = &rest[m.range.end..];
                }
                None
            }
        });
        match found {
            Some(fragment) => fragment.to_string(),
            None => wrap_url(candidate).unwrap_or_else(|_| candidate.to_string()),
        }
    }

    fn rewrite_import(&mut self, import: &mut ImportRule<'_>) -> Result<(), Error> {
        if extract::is_data_uri(&import.url) {
            return Ok(());
        }
        let candidate = import.url.to_string();
        let replacement = self.replace(&candidate, true, import.loc.line)?;
        import.url = replacement.into();
        Ok(())
    }
}

impl<'i> Visitor<'i> for UrlRewriter<'_> {
    type Error = Error;

    fn visit_types(&self) -> VisitTypes {
        visit_types!(URLS | IMAGES | RULES)
    }

    fn visit_rule(&mut self, rule: &mut CssRule<'i>) -> Result<(), Self::Error> {
        if self.depth > 0 {
            return Ok(());
        }
        match Rule::from(rule) {
            Rule::Declarations(rule) => {
                self.depth += 1;
                let result = rule.visit_children(self);
                self.depth -= 1;
                result
            }
            Rule::Import(import) => self.rewrite_import(import),
            Rule::Other => Ok(()),
        }
    }

    fn visit_image(&mut self, image: &mut Image<'i>) -> Result<(), Self::Error> {
        match image {
            // Options are skipped by the derived traversal.
            Image::ImageSet(set) => {
                for option in &mut set.options {
                    option.image.visit(self)?;
                }
                Ok(())
            }
            image => image.visit_children(self),
        }
    }

    fn visit_url(&mut self, url: &mut Url<'i>) -> Result<(), Self::Error> {
        if extract::is_data_uri(&url.url) {
            return Ok(());
        }
        let candidate = url.url.to_string();
        let replacement = self.replace(&candidate, false, url.loc.line)?;
        url.url = replacement.into();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn echo() -> CssRewriter {
        CssRewriter::builder()
            .transform(|url, _cx| Ok(url.to_string()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_without_transform_fails() {
        let err = CssRewriter::builder().debug(true).build().unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("required transform function missing"));
    }

    #[test]
    fn test_options_are_kept() {
        let rewriter = CssRewriter::builder()
            .transform(|url, _cx| Ok(url.to_string()))
            .options(RewriteOptions {
                debug: true,
                minify: true,
            })
            .build()
            .unwrap();
        assert!(rewriter.options().debug);
        assert!(rewriter.options().minify);
    }

    #[test]
    fn test_original_fragment_for_declaration() {
        let rewriter = echo();
        let source = ".a { color: red }\n.b { background: url(x.png), url( 'y.png' ) }";
        let visitor = UrlRewriter {
            rewriter: &rewriter,
            source,
            source_file: Utf8Path::new("a.css"),
            depth: 0,
        };
        assert_eq!(visitor.original_fragment("y.png", false, 1), "url( 'y.png' )");
        assert_eq!(visitor.original_fragment("x.png", false, 1), "url(x.png)");
        // Not found on that line: fall back to the normalized form
        assert_eq!(visitor.original_fragment("x.png", false, 0), r#"url("x.png")"#);
    }

    #[test]
    fn test_original_fragment_for_import() {
        let rewriter = echo();
        let source = "@import 'a.css';\n@import url(b.css) print;";
        let visitor = UrlRewriter {
            rewriter: &rewriter,
            source,
            source_file: Utf8Path::new("a.css"),
            depth: 0,
        };
        assert_eq!(visitor.original_fragment("a.css", true, 0), "'a.css'");
        assert_eq!(visitor.original_fragment("b.css", true, 1), "url(b.css)");
    }
}
