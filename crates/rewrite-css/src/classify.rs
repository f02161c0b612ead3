//! Lexical URL classification.
//!
//! Nothing here touches the filesystem: a candidate is judged purely by its
//! text, the way a browser would before resolving it against a base.

use url::{ParseError, Url};

/// Classification flags for one candidate URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    /// No scheme and no host: a document-relative or root-relative path.
    pub is_relative_url: bool,
    /// Starts with `/`: resolved against the site root.
    pub is_relative_to_base: bool,
}

/// Classify a candidate URL.
pub fn classify(candidate: &str) -> Classification {
    Classification {
        is_relative_url: is_relative_url(candidate),
        is_relative_to_base: is_relative_to_base(candidate),
    }
}

/// Returns true when the candidate has neither a scheme nor a host.
///
/// `//cdn.example.com/x.png` carries a host, so it is not relative.
pub fn is_relative_url(candidate: &str) -> bool {
    if candidate.starts_with("//") {
        return false;
    }
    match Url::parse(candidate) {
        Ok(_) => false,
        Err(ParseError::RelativeUrlWithoutBase) => true,
        // A scheme was recognized but the rest is malformed (`http://`).
        Err(_) => false,
    }
}

/// Returns true when the candidate starts with a path separator.
pub fn is_relative_to_base(candidate: &str) -> bool {
    candidate.starts_with('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_urls_are_not_relative() {
        assert!(!is_relative_url("http://a.com/x.png"));
        assert!(!is_relative_url("https://cdn.example.com/fonts/a.woff2"));
        assert!(!is_relative_url("data:image/png;base64,AAAA"));
        assert!(!is_relative_url("mailto:someone@example.com"));
    }

    #[test]
    fn test_protocol_relative_has_host() {
        assert!(!is_relative_url("//cdn.example.com/x.png"));
        // ...but it still starts with a separator
        assert!(is_relative_to_base("//cdn.example.com/x.png"));
    }

    #[test]
    fn test_relative_paths() {
        assert!(is_relative_url("../img/x.png"));
        assert!(is_relative_url("img/x.png"));
        assert!(is_relative_url("/img/x.png"));
        assert!(is_relative_url("x.png?v=2#top"));
        assert!(is_relative_url(""));
    }

    #[test]
    fn test_relative_to_base() {
        assert!(is_relative_to_base("/img/x.png"));
        assert!(!is_relative_to_base("img/x.png"));
        assert!(!is_relative_to_base("./img/x.png"));
        assert!(!is_relative_to_base("http://a.com/img/x.png"));
    }

    #[test]
    fn test_classify_combines_both_flags() {
        assert_eq!(
            classify("/img/x.png"),
            Classification {
                is_relative_url: true,
                is_relative_to_base: true,
            }
        );
        assert_eq!(
            classify("https://a.com/x.png"),
            Classification {
                is_relative_url: false,
                is_relative_to_base: false,
            }
        );
    }
}
