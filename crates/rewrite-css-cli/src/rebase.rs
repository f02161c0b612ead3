//! Rebasing transform: turns stylesheet-relative URLs into site URLs.
//!
//! Given a project root and a prefix:
//! - absolute URLs (`https://...`, `//cdn/...`) are left as they are
//! - root-relative URLs (`/img/a.png`) get the prefix
//! - document-relative URLs (`../img/a.png`) are resolved against the
//!   stylesheet's directory, made relative to the root, then prefixed
//!
//! Query strings and fragments are carried over untouched.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use rewrite_css::{BoxError, RewriteContext, Transform};

#[derive(Debug, Clone)]
pub struct Rebase {
    root: Utf8PathBuf,
    prefix: String,
}

impl Rebase {
    pub fn new(root: impl AsRef<Utf8Path>, prefix: impl Into<String>) -> Self {
        Self {
            root: normalize(root.as_ref()),
            prefix: prefix.into(),
        }
    }

    fn join(&self, site_path: &str) -> String {
        format!(
            "{}/{}",
            self.prefix.trim_end_matches('/'),
            site_path.trim_start_matches('/')
        )
    }
}

impl Transform for Rebase {
    fn transform(&self, candidate: &str, cx: &RewriteContext<'_>) -> Result<String, BoxError> {
        if !cx.is_relative_url {
            return Ok(candidate.to_string());
        }

        let (path, suffix) = split_suffix(candidate);
        if path.is_empty() {
            // `#id` or `?v=1` alone refer to the stylesheet itself
            return Ok(candidate.to_string());
        }

        if cx.is_relative_to_base {
            return Ok(format!("{}{suffix}", self.join(path)));
        }

        let resolved = normalize(&cx.source_dir.join(path));
        let site_path = resolved.strip_prefix(&self.root).map_err(|_| {
            format!(
                "`{candidate}` in {} resolves to {resolved}, which is outside {}",
                cx.source_file, self.root
            )
        })?;
        Ok(format!("{}{suffix}", self.join(site_path.as_str())))
    }
}

/// Split `a.png?v=1#x` into `a.png` and `?v=1#x`.
fn split_suffix(url: &str) -> (&str, &str) {
    match url.find(['?', '#']) {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    }
}

/// Lexically resolve `.` and `..` components.
fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Utf8Component::Normal(_)))
                    && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_str()),
        }
    }
    out
}
