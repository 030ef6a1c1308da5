//! Document Sources
//!
//! A document is read completely into memory before it is parsed. For
//! streams that means draining the reader to EOF here, so callers never
//! buffer anything themselves. A stream may be borrowed; it is only used
//! for the duration of the read.

use crate::error::ParseError;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;

/// Where a document's bytes come from
pub enum DocumentSource<'a> {
    Path(PathBuf),
    Stream(Box<dyn Read + 'a>),
}

impl<'a> DocumentSource<'a> {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        DocumentSource::Path(path.into())
    }

    pub fn stream<R: Read + 'a>(reader: R) -> Self {
        DocumentSource::Stream(Box::new(reader))
    }

    /// Short label for log output
    pub fn kind(&self) -> &'static str {
        match self {
            DocumentSource::Path(_) => "path",
            DocumentSource::Stream(_) => "stream",
        }
    }

    /// Read the entire source into memory
    pub fn read_all(self) -> Result<Vec<u8>, ParseError> {
        match self {
            DocumentSource::Path(path) => {
                let file = File::open(&path).map_err(|source| ParseError::Io {
                    path: path.clone(),
                    source,
                })?;
                read_all(BufReader::new(file))
                    .map_err(|source| ParseError::Io { path, source })
            }
            DocumentSource::Stream(reader) => read_all(reader).map_err(ParseError::Stream),
        }
    }
}

impl fmt::Debug for DocumentSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            DocumentSource::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Drain a Read source to EOF
pub fn read_all<R: Read>(mut reader: R) -> std::io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;
    Ok(buffer)
}
