//! Errors returned by the previewer.
use std::io;
use std::path::PathBuf;

use store::ErrorKind;
use thiserror::Error;

use crate::config::ConfigError;
use crate::sniff::SniffError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PreviewError {
    #[error("stored file not found: {0}")]
    NotFound(String),

    /// No delimiter was supplied and none could be inferred.
    #[error("could not detect a delimiter: {0}; pass an explicit delimiter")]
    Detection(#[from] SniffError),

    #[error("delimiter must be a single ASCII character, got {0:?}")]
    InvalidDelimiter(String),

    /// The file is not readable as delimited text (e.g. a cell is not UTF-8).
    #[error("malformed delimited text near line {line}: {message}")]
    Malformed { line: u64, message: String },

    #[error("invalid preview configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PreviewError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PreviewError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PreviewError::NotFound(_) => ErrorKind::NotFound,
            PreviewError::Detection(_) => ErrorKind::Detection,
            PreviewError::InvalidDelimiter(_)
            | PreviewError::Malformed { .. }
            | PreviewError::Config(_) => ErrorKind::Validation,
            PreviewError::Io { .. } => ErrorKind::Io,
        }
    }
}
