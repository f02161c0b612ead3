//! Lexical extraction of URL tokens from CSS text.
//!
//! The parser hands URL literals to the rewriter already unquoted, so these
//! helpers work on raw source text: they recover the original fragment a
//! rewrite replaced (for debug output), and they define how candidates are
//! cleaned and re-wrapped.

use std::ops::Range;
use std::sync::LazyLock;

use lightningcss::dependencies::Location;
use lightningcss::error::PrinterError;
use lightningcss::stylesheet::PrinterOptions;
use lightningcss::traits::ToCss;
use lightningcss::values::string::CowArcStr;
use lightningcss::values::url::Url;
use regex::Regex;

/// `url( <anything but ')'> )` anywhere in a value
static DECLARATION_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"url\s*\(\s*([^)]+)\)").unwrap());

/// `url(...)` at the start of an import target
static IMPORT_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^url\s*\(\s*([^)]+)\)").unwrap());

/// `"..."` or `'...'` at the start of an import target, same quote on both ends
static IMPORT_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(?:"\s*([^'"]+)"|'\s*([^'"]+)')"#).unwrap());

/// One URL token found in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlMatch<'a> {
    /// The whole matched text, e.g. `url('a.png')` or `"a.css"`.
    pub fragment: &'a str,
    /// The cleaned candidate, e.g. `a.png`.
    pub candidate: &'a str,
    /// Byte range of `fragment` within the searched text.
    pub range: Range<usize>,
}

/// Trim whitespace, then strip one pair of matching `"` or `'` quotes.
///
/// A lone leading or trailing quote is kept as literal content.
pub fn clean_candidate(raw: &str) -> &str {
    let trimmed = raw.trim();
    let bytes = trimmed.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        if (first == b'"' || first == b'\'') && bytes[bytes.len() - 1] == first {
            return &trimmed[1..trimmed.len() - 1];
        }
    }
    trimmed
}

/// Returns true for inline `data:` URIs, optionally preceded by a quote.
pub fn is_data_uri(raw: &str) -> bool {
    let raw = raw.trim_start();
    let raw = raw
        .strip_prefix('"')
        .or_else(|| raw.strip_prefix('\''))
        .unwrap_or(raw);
    raw.starts_with("data:")
}

/// Find the first `url(...)` in a declaration value that is not a data URI.
pub fn find_declaration_url(value: &str) -> Option<UrlMatch<'_>> {
    DECLARATION_URL.captures_iter(value).find_map(|caps| {
        let whole = caps.get(0)?;
        let inner = caps.get(1)?;
        if is_data_uri(inner.as_str()) {
            return None;
        }
        Some(UrlMatch {
            fragment: whole.as_str(),
            candidate: clean_candidate(inner.as_str()),
            range: whole.range(),
        })
    })
}

/// Find the URL at the start of an `@import` target.
///
/// The target is either wrapped in `url(...)` or a bare quoted string.
/// Leading whitespace is skipped.
pub fn find_import_url(target: &str) -> Option<UrlMatch<'_>> {
    let trimmed = target.trim_start();
    let offset = target.len() - trimmed.len();

    if let Some(caps) = IMPORT_URL.captures(trimmed) {
        let whole = caps.get(0)?;
        let inner = caps.get(1)?;
        if is_data_uri(inner.as_str()) {
            return None;
        }
        return Some(UrlMatch {
            fragment: whole.as_str(),
            candidate: clean_candidate(inner.as_str()),
            range: offset + whole.start()..offset + whole.end(),
        });
    }

    let caps = IMPORT_STRING.captures(trimmed)?;
    let whole = caps.get(0)?;
    let inner = caps.get(1).or_else(|| caps.get(2))?;
    if is_data_uri(inner.as_str()) {
        return None;
    }
    Some(UrlMatch {
        fragment: whole.as_str(),
        candidate: clean_candidate(inner.as_str()),
        range: offset + whole.start()..offset + whole.end(),
    })
}

/// Wrap a replacement as `url("...")`, escaped by the CSS string serializer.
pub fn wrap_url(url: &str) -> Result<String, PrinterError> {
    let url = Url {
        url: CowArcStr::from(url),
        loc: Location { line: 1, column: 1 },
    };
    // The non-minifying printer always quotes.
    url.to_css_string(PrinterOptions::default())
}
