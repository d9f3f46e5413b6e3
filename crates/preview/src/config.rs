//! Configuration for the tabular previewer.
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delimiters the default sniffer considers, in no particular order.
pub const DEFAULT_CANDIDATES: [char; 5] = [',', '\t', ';', '|', ':'];

/// Runtime configuration for [`Previewer`](crate::Previewer).
///
/// `content_dir` must point at the same directory the upload store writes
/// to; the previewer never creates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub content_dir: PathBuf,

    /// Bytes read from the start of a file for delimiter sniffing.
    pub sample_bytes: usize,

    /// Rows returned when a request does not say.
    pub default_max_lines: usize,

    /// Upper bound for a requested `maxLines`; larger requests are clamped.
    pub max_lines_cap: usize,

    /// Candidate delimiters for sniffing. Each must be a single ASCII character.
    pub candidates: Vec<char>,

    /// Minimum share of sample records that must agree on a delimiter count.
    pub min_consistency: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("uploads"),
            sample_bytes: 8 * 1024,
            default_max_lines: 10,
            max_lines_cap: 1000,
            candidates: DEFAULT_CANDIDATES.to_vec(),
            min_consistency: 0.9,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("sample_bytes must be > 0")]
    ZeroSample,

    #[error("default_max_lines ({default}) exceeds max_lines_cap ({cap})")]
    DefaultExceedsCap { default: usize, cap: usize },

    #[error("candidate delimiter {0:?} is not a single ASCII character")]
    NonAsciiCandidate(char),

    #[error("candidate delimiter {0:?} collides with quoting or line breaks")]
    ReservedCandidate(char),

    #[error("candidate list is empty")]
    NoCandidates,

    #[error("min_consistency must be within (0, 1], got {0}")]
    InvalidConsistency(f64),
}

impl PreviewConfig {
    pub fn new(content_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: content_dir.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_bytes == 0 {
            return Err(ConfigError::ZeroSample);
        }
        if self.default_max_lines > self.max_lines_cap {
            return Err(ConfigError::DefaultExceedsCap {
                default: self.default_max_lines,
                cap: self.max_lines_cap,
            });
        }
        if self.candidates.is_empty() {
            return Err(ConfigError::NoCandidates);
        }
        for &candidate in &self.candidates {
            if !candidate.is_ascii() {
                return Err(ConfigError::NonAsciiCandidate(candidate));
            }
            if matches!(candidate, '"' | '\n' | '\r') {
                return Err(ConfigError::ReservedCandidate(candidate));
            }
        }
        if !(self.min_consistency > 0.0 && self.min_consistency <= 1.0) {
            return Err(ConfigError::InvalidConsistency(self.min_consistency));
        }
        Ok(())
    }

    /// Effective row limit for a request.
    pub fn effective_max_lines(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_max_lines)
            .min(self.max_lines_cap)
    }
}
