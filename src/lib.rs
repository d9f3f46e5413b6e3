//! Workspace umbrella crate for Filedock.
//!
//! This crate wires the upload store and the tabular previewer together from
//! a single [`FiledockConfig`], so both agree on the content directory and
//! the directory is created exactly once, in [`Filedock::init`].

pub mod config;

pub use config::{ConfigLoadError, FiledockConfig, PreviewYamlConfig};
pub use preview::{
    ConsistencySniffer, PreviewConfig, PreviewError, PreviewRequest, PreviewResult, Previewer,
    Sample, SniffError, Sniffer,
};
pub use store::{
    basename, sanitize_filename, stored_name, ErrorKind, StoreConfig, StoreError, StoredFile,
    UploadBatch, UploadPart, UploadStore,
};

use std::collections::BTreeMap;
use std::error::Error;
use std::fmt;

use tracing::info;

/// Errors surfaced by [`Filedock`] operations.
#[derive(Debug)]
pub enum DockError {
    Config(ConfigLoadError),
    Store(StoreError),
    Preview(PreviewError),
}

impl DockError {
    /// Four-way classification used to pick a response status.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DockError::Config(_) => ErrorKind::Validation,
            DockError::Store(err) => err.kind(),
            DockError::Preview(err) => err.kind(),
        }
    }
}

impl fmt::Display for DockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DockError::Config(err) => write!(f, "configuration failure: {err}"),
            DockError::Store(err) => write!(f, "upload failure: {err}"),
            DockError::Preview(err) => write!(f, "preview failure: {err}"),
        }
    }
}

impl Error for DockError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DockError::Config(err) => Some(err),
            DockError::Store(err) => Some(err),
            DockError::Preview(err) => Some(err),
        }
    }
}

impl From<ConfigLoadError> for DockError {
    fn from(value: ConfigLoadError) -> Self {
        DockError::Config(value)
    }
}

impl From<StoreError> for DockError {
    fn from(value: StoreError) -> Self {
        DockError::Store(value)
    }
}

impl From<PreviewError> for DockError {
    fn from(value: PreviewError) -> Self {
        DockError::Preview(value)
    }
}

/// Upload store and previewer over one content directory.
///
/// The two halves share no in-memory state; the stored name returned by an
/// upload is the only key a later preview needs.
#[derive(Debug, Clone)]
pub struct Filedock {
    store: UploadStore,
    previewer: Previewer,
}

impl Filedock {
    /// Validate `config`, create the content directory and build both components.
    pub fn init(config: &FiledockConfig) -> Result<Self, DockError> {
        config.validate()?;
        let store = UploadStore::init(config.store_config())?;
        let previewer = Previewer::new(config.preview_config())?;
        info!(
            content_dir = %store.content_dir().display(),
            "filedock_ready"
        );
        Ok(Self { store, previewer })
    }

    pub fn store(&self) -> &UploadStore {
        &self.store
    }

    pub fn previewer(&self) -> &Previewer {
        &self.previewer
    }

    /// Persist every part of `batch`; see [`UploadStore::store_batch`].
    pub fn upload(&self, batch: UploadBatch) -> Result<BTreeMap<String, StoredFile>, DockError> {
        Ok(self.store.store_batch(batch)?)
    }

    pub fn preview(&self, request: &PreviewRequest) -> Result<PreviewResult, DockError> {
        Ok(self.previewer.preview(request)?)
    }
}
