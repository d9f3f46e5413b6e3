//! Error types produced by the store crate.
//!
//! Every failure falls into one of four [`ErrorKind`]s so that callers (the
//! HTTP layer in particular) can map them to a status without matching on
//! individual variants:
//!
//! | Kind | Variants | Typical status |
//! |------|----------|----------------|
//! | [`Validation`](ErrorKind::Validation) | `EmptyBatch`, `InvalidLabel`, `DuplicateLabel`, `Config` | 400 |
//! | [`NotFound`](ErrorKind::NotFound) | `NotFound` | 404 |
//! | [`Io`](ErrorKind::Io) | `Io` | 500 |
//!
//! The store never produces [`ErrorKind::Detection`]; that kind belongs to the
//! tabular previewer and lives here so both crates share one taxonomy.
use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Coarse classification shared by the store and the previewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller input is structurally invalid.
    Validation,
    /// A stored name does not resolve to an existing file.
    NotFound,
    /// A delimiter could not be inferred from a sample.
    Detection,
    /// Underlying filesystem failure.
    Io,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Detection => "detection",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`UploadStore`](crate::UploadStore).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StoreError {
    /// An upload batch carried no parts at all.
    #[error("no files provided; send at least one labelled part")]
    EmptyBatch,

    /// The label cannot be used as a stored-name prefix.
    #[error("invalid label {0:?}: must be a non-empty name without path separators")]
    InvalidLabel(String),

    /// Two parts of one batch used the same label.
    #[error("label {0:?} appears more than once in the batch")]
    DuplicateLabel(String),

    /// The stored name derived from the caller's filename cannot be created.
    #[error("invalid filename {0:?}: must not contain NUL and must fit in {max} bytes once prefixed", max = crate::naming::MAX_STORED_NAME_BYTES)]
    InvalidFilename(String),

    #[error("invalid store configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("stored file not found: {0}")]
    NotFound(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::EmptyBatch
            | StoreError::InvalidLabel(_)
            | StoreError::DuplicateLabel(_)
            | StoreError::InvalidFilename(_)
            | StoreError::Config(_) => ErrorKind::Validation,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Io { .. } => ErrorKind::Io,
        }
    }
}
