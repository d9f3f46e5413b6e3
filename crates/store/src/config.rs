//! Configuration for the upload store.
//!
//! [`StoreConfig`] is passed into [`UploadStore::init`](crate::UploadStore::init)
//! explicitly; nothing in this crate reads process-wide state or creates
//! directories on load.
//!
//! ```rust
//! use store::StoreConfig;
//!
//! let config = StoreConfig::new("/srv/uploads").with_serve_prefix("/files");
//! config.validate().expect("valid store config");
//! assert_eq!(config.retrieval_path("csv__data.csv"), "/files/csv__data.csv");
//! ```
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Runtime configuration for the upload store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory that receives every stored file. Created by `UploadStore::init`.
    pub content_dir: PathBuf,

    /// URL prefix the static file server mounts `content_dir` under.
    pub serve_prefix: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("uploads"),
            serve_prefix: "/files".to_string(),
        }
    }
}

/// Invalid store configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("content_dir must not be empty")]
    EmptyContentDir,

    #[error("serve_prefix must start with '/' and name at least one segment, got {0:?}")]
    InvalidServePrefix(String),
}

impl StoreConfig {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_serve_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.serve_prefix = prefix.into();
        self
    }

    /// Check the configuration before any directory is touched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyContentDir);
        }

        let trimmed = self.serve_prefix.trim_end_matches('/');
        if !trimmed.starts_with('/') || trimmed.len() < 2 {
            return Err(ConfigError::InvalidServePrefix(self.serve_prefix.clone()));
        }

        Ok(())
    }

    /// Serving prefix without a trailing slash, e.g. `/files`.
    pub fn normalized_prefix(&self) -> &str {
        self.serve_prefix.trim_end_matches('/')
    }

    /// Retrieval path for a stored name under the serving prefix.
    pub fn retrieval_path(&self, stored_name: &str) -> String {
        format!("{}/{}", self.normalized_prefix(), stored_name)
    }
}
