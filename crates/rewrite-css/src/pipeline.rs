//! The rewriter as a stage in a file-processing pipeline.
//!
//! A [`SourceFile`] arrives with no contents, an in-memory buffer, or a
//! byte stream. Streams are buffered completely before parsing since CSS
//! can't be rewritten incrementally.

use std::io::Cursor;
use std::pin::Pin;

use camino::{Utf8Path, Utf8PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Error;
use crate::rewriter::CssRewriter;

/// File contents as handed over by the previous stage.
pub enum Contents {
    /// Nothing to process (a directory, or contents not loaded).
    Null,
    /// Fully materialized bytes.
    Buffer(Vec<u8>),
    /// Bytes still to be read.
    Stream(Pin<Box<dyn AsyncRead + Send>>),
}

impl std::fmt::Debug for Contents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Contents::Null => f.write_str("Null"),
            Contents::Buffer(bytes) => write!(f, "Buffer({} bytes)", bytes.len()),
            Contents::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// A file flowing through the pipeline.
#[derive(Debug)]
pub struct SourceFile {
    pub path: Utf8PathBuf,
    pub contents: Contents,
}

impl SourceFile {
    pub fn null(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            contents: Contents::Null,
        }
    }

    pub fn buffer(path: impl Into<Utf8PathBuf>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: Contents::Buffer(bytes.into()),
        }
    }

    pub fn stream(path: impl Into<Utf8PathBuf>, reader: impl AsyncRead + Send + 'static) -> Self {
        Self {
            path: path.into(),
            contents: Contents::Stream(Box::pin(reader)),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.contents, Contents::Null)
    }

    pub fn is_stream(&self) -> bool {
        matches!(self.contents, Contents::Stream(_))
    }

    /// Consume the file and return its bytes, reading a stream to the end.
    pub async fn into_bytes(self) -> Result<Option<Vec<u8>>, Error> {
        match self.contents {
            Contents::Null => Ok(None),
            Contents::Buffer(bytes) => Ok(Some(bytes)),
            Contents::Stream(reader) => read_all(&self.path, reader).await.map(Some),
        }
    }
}

async fn read_all(
    path: &Utf8Path,
    mut reader: Pin<Box<dyn AsyncRead + Send>>,
) -> Result<Vec<u8>, Error> {
    let mut buf = Vec::new();
    reader
        .read_to_end(&mut buf)
        .await
        .map_err(|source| Error::UpstreamRead {
            path: path.to_owned(),
            source,
        })?;
    Ok(buf)
}

impl CssRewriter {
    fn rewrite_bytes(&self, path: &Utf8Path, bytes: Vec<u8>) -> Result<Vec<u8>, Error> {
        let css = String::from_utf8(bytes).map_err(|source| Error::Encoding {
            path: path.to_owned(),
            source,
        })?;
        Ok(self.rewrite(&css, path)?.into_bytes())
    }

    /// Process one file.
    ///
    /// Null contents pass through untouched. Buffers come back as new buffers,
    /// streams as a stream over the rewritten bytes.
    pub async fn process(&self, file: SourceFile) -> Result<SourceFile, Error> {
        let SourceFile { path, contents } = file;
        let contents = match contents {
            Contents::Null => Contents::Null,
            Contents::Buffer(bytes) => Contents::Buffer(self.rewrite_bytes(&path, bytes)?),
            Contents::Stream(reader) => {
                let bytes = read_all(&path, reader).await?;
                let rewritten = self.rewrite_bytes(&path, bytes)?;
                Contents::Stream(Box::pin(Cursor::new(rewritten)))
            }
        };
        Ok(SourceFile { path, contents })
    }

    /// Process files one after another, in order.
    ///
    /// Each file gets its own result; a failure never stops the batch.
    pub async fn process_all(
        &self,
        files: impl IntoIterator<Item = SourceFile>,
    ) -> Vec<Result<SourceFile, Error>> {
        let mut results = Vec::new();
        for file in files {
            let path = file.path.clone();
            let result = self.process(file).await;
            if let Err(e) = &result {
                tracing::debug!(%path, error = %e, "file not rewritten");
            }
            results.push(result);
        }
        results
    }
}
