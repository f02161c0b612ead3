//! Error types for CSS URL rewriting.

use camino::Utf8PathBuf;

/// Error type returned by transform functions.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while setting up the rewriter or processing a file.
///
/// Every per-file error names the file it came from. A file either rewrites
/// completely or produces one of these; there is no partial output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The rewriter was built without a usable transform.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The CSS text could not be parsed into a rule tree.
    #[error("failed to parse {path}: {message}")]
    Parse { path: Utf8PathBuf, message: String },

    /// The rewritten rule tree could not be printed back to CSS.
    #[error("failed to serialize {path}: {message}")]
    Serialize { path: Utf8PathBuf, message: String },

    /// Reading streamed contents failed before buffering completed.
    #[error("failed to read contents of {path}")]
    UpstreamRead {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The contents are not valid UTF-8.
    #[error("contents of {path} are not valid UTF-8")]
    Encoding {
        path: Utf8PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    /// The transform function failed for a URL.
    #[error("transform failed for `{url}` in {path}")]
    Transform {
        path: Utf8PathBuf,
        url: String,
        #[source]
        source: BoxError,
    },
}

impl Error {
    /// The file this error is about, if it is a per-file error.
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Error::Configuration(_) => None,
            Error::Parse { path, .. }
            | Error::Serialize { path, .. }
            | Error::UpstreamRead { path, .. }
            | Error::Encoding { path, .. }
            | Error::Transform { path, .. } => Some(path),
        }
    }
}
