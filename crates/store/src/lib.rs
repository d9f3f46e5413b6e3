//! Filedock upload store
//!
//! Persists uploaded files under deterministic, traversal-safe names inside a
//! single content directory and describes each write with a [`StoredFile`].
//!
//! ## What we do here
//!
//! - **Sanitize names** - keep only the final path segment of the caller's
//!   filename, fall back to the label when that is empty, replace spaces.
//! - **Namespace by label** - stored names are `"{label}__{name}"`, so a spec
//!   document and a data file with the same filename never collide.
//! - **Overwrite, never accumulate** - the stored name is a pure function of
//!   `(label, filename)`; a repeated upload replaces the previous content.
//! - **Write whole files** - content lands in a temp file in the content
//!   directory and is renamed over the target, so readers never observe a
//!   half-written upload.
//!
//! Two concurrent uploads that map to the same stored name race; the last
//! rename wins. No locking is attempted.
//!
//! ## Example
//!
//! ```no_run
//! use store::{StoreConfig, UploadStore};
//!
//! let store = UploadStore::init(StoreConfig::new("uploads")).unwrap();
//! let stored = store.store("csv", "My Data.csv", b"a,b\n1,2\n3,4\n").unwrap();
//!
//! assert_eq!(stored.stored_name, "csv__My_Data.csv");
//! assert_eq!(stored.size_bytes, 12);
//! assert_eq!(stored.retrieval_path, "/files/csv__My_Data.csv");
//! ```
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

mod config;
mod error;
pub mod naming;

pub use crate::config::{ConfigError, StoreConfig};
pub use crate::error::{ErrorKind, StoreError};
pub use crate::naming::{basename, sanitize_filename, stored_name};

/// Metadata describing one persisted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Caller's filename reduced to its final path segment.
    #[serde(rename = "filename")]
    pub original_name: String,
    pub label: String,
    #[serde(rename = "stored_as")]
    pub stored_name: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "url")]
    pub retrieval_path: String,
}

/// One labelled file of an upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPart {
    pub label: String,
    /// Filename as sent by the client, if any.
    pub filename: Option<String>,
    pub content: Bytes,
}

impl UploadPart {
    pub fn new(label: impl Into<String>, filename: Option<String>, content: impl Into<Bytes>) -> Self {
        Self {
            label: label.into(),
            filename,
            content: content.into(),
        }
    }
}

/// Optional labelled parts collected from one upload request.
///
/// Parts are keyed by label; inserting a second part under the same label is
/// rejected rather than silently dropping one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadBatch {
    parts: BTreeMap<String, UploadPart>,
}

impl UploadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, part: UploadPart) -> Result<(), StoreError> {
        if !naming::is_valid_label(&part.label) {
            return Err(StoreError::InvalidLabel(part.label));
        }
        if self.parts.contains_key(&part.label) {
            return Err(StoreError::DuplicateLabel(part.label));
        }
        self.parts.insert(part.label.clone(), part);
        Ok(())
    }

    pub fn with_part(mut self, part: UploadPart) -> Result<Self, StoreError> {
        self.insert(part)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    /// Batch must carry at least one part, and every part must map to a
    /// stored name the content directory can hold.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.parts.is_empty() {
            return Err(StoreError::EmptyBatch);
        }
        for part in self.parts.values() {
            let filename = part.filename.as_deref().unwrap_or_default();
            if !naming::is_storable_name(&naming::stored_name(&part.label, filename)) {
                return Err(StoreError::InvalidFilename(filename.to_string()));
            }
        }
        Ok(())
    }
}

/// Writes uploads into the configured content directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    config: StoreConfig,
}

impl UploadStore {
    /// Validate `config` and create the content directory if it is missing.
    ///
    /// This is the only place the store creates directories.
    pub fn init(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        fs::create_dir_all(&config.content_dir)
            .map_err(|err| StoreError::io(&config.content_dir, err))?;
        info!(
            content_dir = %config.content_dir.display(),
            serve_prefix = %config.normalized_prefix(),
            "store_initialized"
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn content_dir(&self) -> &Path {
        &self.config.content_dir
    }

    /// Persist `content` under the stored name derived from `label` and
    /// `original_filename`, replacing any previous file with that name.
    pub fn store(
        &self,
        label: &str,
        original_filename: &str,
        content: &[u8],
    ) -> Result<StoredFile, StoreError> {
        let start = Instant::now();
        match self.store_inner(label, original_filename, content) {
            Ok(stored) => {
                info!(
                    label = %stored.label,
                    stored_name = %stored.stored_name,
                    size_bytes = stored.size_bytes,
                    elapsed_micros = start.elapsed().as_micros(),
                    "store_success"
                );
                Ok(stored)
            }
            Err(err) => {
                warn!(
                    label,
                    original_filename,
                    kind = %err.kind(),
                    error = %err,
                    elapsed_micros = start.elapsed().as_micros(),
                    "store_failure"
                );
                Err(err)
            }
        }
    }

    fn store_inner(
        &self,
        label: &str,
        original_filename: &str,
        content: &[u8],
    ) -> Result<StoredFile, StoreError> {
        if !naming::is_valid_label(label) {
            return Err(StoreError::InvalidLabel(label.to_string()));
        }

        let stored_name = naming::stored_name(label, original_filename);
        if !naming::is_storable_name(&stored_name) {
            return Err(StoreError::InvalidFilename(original_filename.to_string()));
        }
        let target = self.config.content_dir.join(&stored_name);
        write_replacing(&self.config.content_dir, &target, content)?;

        Ok(StoredFile {
            original_name: naming::original_name(label, original_filename).to_string(),
            label: label.to_string(),
            retrieval_path: self.config.retrieval_path(&stored_name),
            stored_name,
            size_bytes: content.len() as u64,
        })
    }

    /// Store every part of `batch`, keyed by label.
    ///
    /// Validation happens before the first write. Parts are written in label
    /// order and the first failure is returned as-is.
    pub fn store_batch(&self, batch: UploadBatch) -> Result<BTreeMap<String, StoredFile>, StoreError> {
        if let Err(err) = batch.validate() {
            warn!(error = %err, "store_batch_rejected");
            return Err(err);
        }

        let mut saved = BTreeMap::new();
        for (label, part) in batch.parts {
            let filename = part.filename.as_deref().unwrap_or_default();
            let stored = self.store(&label, filename, &part.content)?;
            saved.insert(label, stored);
        }
        Ok(saved)
    }

    /// Path of an existing stored file. Only the basename of `stored_name` is
    /// used, so the result always lies directly inside the content directory.
    pub fn resolve(&self, stored_name: &str) -> Result<PathBuf, StoreError> {
        let name = naming::basename(stored_name);
        if name.is_empty() {
            return Err(StoreError::NotFound(stored_name.to_string()));
        }
        let path = self.config.content_dir.join(name);
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => Ok(path),
            Ok(_) => Err(StoreError::NotFound(stored_name.to_string())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(stored_name.to_string()))
            }
            Err(err) => Err(StoreError::io(path, err)),
        }
    }

    /// Whole content of a stored file.
    pub fn read(&self, stored_name: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(stored_name)?;
        fs::read(&path).map_err(|err| StoreError::io(path, err))
    }
}

/// Write `content` to a temp file inside `dir` and rename it over `target`.
/// The temp file is removed if any step before the rename fails.
fn write_replacing(dir: &Path, target: &Path, content: &[u8]) -> Result<(), StoreError> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".upload-")
        .suffix(".part")
        .tempfile_in(dir)
        .map_err(|err| StoreError::io(dir, err))?;
    tmp.write_all(content)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|err| StoreError::io(tmp.path(), err))?;
    tmp.persist(target)
        .map_err(|err| StoreError::io(target, err.error))?;
    debug!(target = %target.display(), bytes = content.len(), "store_write_persisted");
    Ok(())
}
