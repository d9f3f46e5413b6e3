//! YAML configuration file support for Filedock
//!
//! One file configures both components. The content directory is declared
//! once under `storage` and handed to the previewer as well, so the two can
//! never disagree about where stored files live.
//!
//! ## Example YAML configuration
//!
//! ```yaml
//! version: "1.0"
//!
//! storage:
//!   content_dir: "/var/lib/filedock/uploads"
//!   serve_prefix: "/files"
//!
//! preview:
//!   sample_bytes: 8192
//!   default_max_lines: 10
//!   max_lines_cap: 1000
//!   candidates: [",", "\t", ";", "|", ":"]
//!   min_consistency: 0.9
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use preview::PreviewConfig;
use serde::{Deserialize, Serialize};
use store::StoreConfig;
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration for the store and the previewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FiledockConfig {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub storage: StoreConfig,

    #[serde(default)]
    pub preview: PreviewYamlConfig,
}

impl FiledockConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: FiledockConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => {}
            v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }

        self.storage
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("storage: {e}")))?;
        self.preview_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("preview: {e}")))?;
        Ok(())
    }

    /// Point both components at `dir`.
    pub fn with_content_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage.content_dir = dir.into();
        self
    }

    pub fn store_config(&self) -> StoreConfig {
        self.storage.clone()
    }

    /// Previewer configuration sharing the storage content directory.
    pub fn preview_config(&self) -> PreviewConfig {
        self.preview.to_preview_config(&self.storage.content_dir)
    }
}

impl Default for FiledockConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            name: None,
            storage: StoreConfig::default(),
            preview: PreviewYamlConfig::default(),
        }
    }
}

/// Previewer YAML configuration (the content directory comes from `storage`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewYamlConfig {
    #[serde(default = "default_sample_bytes")]
    pub sample_bytes: usize,

    #[serde(default = "default_max_lines")]
    pub default_max_lines: usize,

    #[serde(default = "default_max_lines_cap")]
    pub max_lines_cap: usize,

    #[serde(default = "default_candidates")]
    pub candidates: Vec<char>,

    #[serde(default = "default_min_consistency")]
    pub min_consistency: f64,
}

impl PreviewYamlConfig {
    pub fn to_preview_config(&self, content_dir: &Path) -> PreviewConfig {
        PreviewConfig {
            content_dir: content_dir.to_path_buf(),
            sample_bytes: self.sample_bytes,
            default_max_lines: self.default_max_lines,
            max_lines_cap: self.max_lines_cap,
            candidates: self.candidates.clone(),
            min_consistency: self.min_consistency,
        }
    }
}

impl Default for PreviewYamlConfig {
    fn default() -> Self {
        Self {
            sample_bytes: default_sample_bytes(),
            default_max_lines: default_max_lines(),
            max_lines_cap: default_max_lines_cap(),
            candidates: default_candidates(),
            min_consistency: default_min_consistency(),
        }
    }
}

fn default_version() -> String {
    "1.0".to_string()
}

fn default_sample_bytes() -> usize {
    PreviewConfig::default().sample_bytes
}

fn default_max_lines() -> usize {
    PreviewConfig::default().default_max_lines
}

fn default_max_lines_cap() -> usize {
    PreviewConfig::default().max_lines_cap
}

fn default_candidates() -> Vec<char> {
    preview::DEFAULT_CANDIDATES.to_vec()
}

fn default_min_consistency() -> f64 {
    PreviewConfig::default().min_consistency
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
storage:
  content_dir: "/srv/uploads"
preview:
  default_max_lines: 5
"#;

        let config = FiledockConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name, Some("test config".to_string()));
        assert_eq!(config.storage.content_dir, PathBuf::from("/srv/uploads"));
        assert_eq!(config.storage.serve_prefix, "/files");
        assert_eq!(config.preview.default_max_lines, 5);
        assert_eq!(config.preview.sample_bytes, 8192);
    }

    #[test]
    fn test_preview_shares_content_dir() {
        let config = FiledockConfig::default().with_content_dir("/data/up");
        assert_eq!(config.preview_config().content_dir, PathBuf::from("/data/up"));
        assert_eq!(config.store_config().content_dir, PathBuf::from("/data/up"));
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1"
storage:
  serve_prefix: "/static"
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = FiledockConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.storage.serve_prefix, "/static");
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = FiledockConfig::from_yaml("{}").unwrap();
        assert_eq!(config, FiledockConfig::default());
    }

    #[test]
    fn test_candidates_from_yaml() {
        let yaml = r#"
preview:
  candidates: [";", "\t"]
"#;
        let config = FiledockConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.preview.candidates, vec![';', '\t']);
    }

    #[test]
    fn test_unsupported_version() {
        let result = FiledockConfig::from_yaml("version: \"2.0\"\n");
        assert!(matches!(result, Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2.0"));
    }

    #[test]
    fn test_storage_validation() {
        let yaml = r#"
storage:
  serve_prefix: "files"
"#;
        let result = FiledockConfig::from_yaml(yaml);
        assert!(result.unwrap_err().to_string().contains("storage"));
    }

    #[test]
    fn test_preview_validation() {
        let yaml = r#"
preview:
  default_max_lines: 50
  max_lines_cap: 10
"#;
        let result = FiledockConfig::from_yaml(yaml);
        assert!(result.unwrap_err().to_string().contains("preview"));
    }
}
