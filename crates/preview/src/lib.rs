//! Filedock tabular previewer
//!
//! Shows the structure of a stored delimited-text file: the delimiter, the
//! header row and the first few data rows, exactly as parsed. No cell is
//! trimmed, typed or null-handled; an empty cell is an empty string.
//!
//! ## How a preview runs
//!
//! 1. The stored name is reduced to its basename and resolved inside the
//!    content directory. Anything else is `NotFound`.
//! 2. An explicit delimiter wins. Without one, the first
//!    [`sample_bytes`](PreviewConfig::sample_bytes) are handed to a
//!    [`Sniffer`]; failure is a [`PreviewError::Detection`], never a guess.
//! 3. The file is parsed from the start with `"` quoting, so quoted fields
//!    may hold delimiters and newlines. The first record is the header row.
//! 4. Reading stops once `maxLines` data rows are collected; large files are
//!    never read in full.
//!
//! ```no_run
//! use preview::{PreviewConfig, PreviewRequest, Previewer};
//!
//! let previewer = Previewer::new(PreviewConfig::new("uploads")).unwrap();
//! let result = previewer
//!     .preview(&PreviewRequest::new("csv__My_Data.csv"))
//!     .unwrap();
//!
//! assert_eq!(result.delimiter, ',');
//! assert_eq!(result.headers, vec!["a", "b"]);
//! ```
use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

mod config;
mod error;
pub mod sniff;

pub use crate::config::{ConfigError, PreviewConfig, DEFAULT_CANDIDATES};
pub use crate::error::PreviewError;
pub use crate::sniff::{ConsistencySniffer, Sample, SniffError, Sniffer};
pub use store::ErrorKind;

/// Preview request as accepted over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewRequest {
    /// Stored name of the file. Only its basename is used.
    #[serde(rename = "filename")]
    pub stored_name: String,

    /// Explicit delimiter; must be one ASCII character. Skips sniffing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,

    #[serde(
        default,
        rename = "maxLines",
        alias = "max_lines",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_lines: Option<usize>,
}

impl PreviewRequest {
    pub fn new(stored_name: impl Into<String>) -> Self {
        Self {
            stored_name: stored_name.into(),
            delimiter: None,
            max_lines: None,
        }
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn with_max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = Some(max_lines);
        self
    }
}

/// Header row and leading data rows of a delimited file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResult {
    pub stored_name: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub row_count: usize,
}

/// Computes previews of files in the content directory.
#[derive(Clone)]
pub struct Previewer {
    config: PreviewConfig,
    sniffer: Arc<dyn Sniffer>,
}

impl fmt::Debug for Previewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Previewer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Previewer {
    pub fn new(config: PreviewConfig) -> Result<Self, PreviewError> {
        config.validate()?;
        let sniffer = Arc::new(ConsistencySniffer::from_config(&config));
        Ok(Self { config, sniffer })
    }

    /// Replace the delimiter heuristic.
    pub fn with_sniffer(mut self, sniffer: impl Sniffer + 'static) -> Self {
        self.sniffer = Arc::new(sniffer);
        self
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn preview(&self, request: &PreviewRequest) -> Result<PreviewResult, PreviewError> {
        let start = Instant::now();
        match self.preview_inner(request) {
            Ok((result, sniffed)) => {
                info!(
                    stored_name = %result.stored_name,
                    delimiter = ?result.delimiter,
                    sniffed,
                    columns = result.headers.len(),
                    row_count = result.row_count,
                    elapsed_micros = start.elapsed().as_micros(),
                    "preview_success"
                );
                Ok(result)
            }
            Err(err) => {
                warn!(
                    stored_name = %request.stored_name,
                    kind = %err.kind(),
                    error = %err,
                    elapsed_micros = start.elapsed().as_micros(),
                    "preview_failure"
                );
                Err(err)
            }
        }
    }

    fn preview_inner(
        &self,
        request: &PreviewRequest,
    ) -> Result<(PreviewResult, bool), PreviewError> {
        let explicit = request
            .delimiter
            .as_deref()
            .map(parse_delimiter)
            .transpose()?;
        let max_lines = self.config.effective_max_lines(request.max_lines);

        let (name, path) = self.resolve(&request.stored_name)?;
        let mut file = open_file(&path, &request.stored_name)?;

        let delimiter = match explicit {
            Some(delimiter) => delimiter,
            None => {
                let delimiter = self.sniff_file(&mut file, &path)?;
                file.rewind().map_err(|err| PreviewError::io(&path, err))?;
                delimiter
            }
        };

        let (headers, rows) = read_rows(file, &path, delimiter, max_lines)?;
        let result = PreviewResult {
            stored_name: name.to_string(),
            delimiter: char::from(delimiter),
            row_count: rows.len(),
            headers,
            rows,
        };
        Ok((result, explicit.is_none()))
    }

    fn resolve<'a>(&self, stored_name: &'a str) -> Result<(&'a str, PathBuf), PreviewError> {
        let name = store::basename(stored_name);
        if name.is_empty() {
            return Err(PreviewError::NotFound(stored_name.to_string()));
        }
        Ok((name, self.config.content_dir.join(name)))
    }

    fn sniff_file(&self, file: &mut File, path: &Path) -> Result<u8, PreviewError> {
        let limit = self.config.sample_bytes;
        let mut buf = Vec::with_capacity(limit + 1);
        file.by_ref()
            .take(limit as u64 + 1)
            .read_to_end(&mut buf)
            .map_err(|err| PreviewError::io(path, err))?;

        let truncated = buf.len() > limit;
        buf.truncate(limit);
        let text = sample_text(&buf, truncated)?;
        Ok(self.sniffer.sniff(Sample { text, truncated })?)
    }
}

fn parse_delimiter(raw: &str) -> Result<u8, PreviewError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() && !matches!(c, '"' | '\n' | '\r') => Ok(c as u8),
        _ => Err(PreviewError::InvalidDelimiter(raw.to_string())),
    }
}

fn open_file(path: &Path, stored_name: &str) -> Result<File, PreviewError> {
    let file = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => PreviewError::NotFound(stored_name.to_string()),
        _ => PreviewError::io(path, err),
    })?;
    let meta = file.metadata().map_err(|err| PreviewError::io(path, err))?;
    if !meta.is_file() {
        return Err(PreviewError::NotFound(stored_name.to_string()));
    }
    Ok(file)
}

/// Decode the sample. A truncated sample may end inside a multi-byte
/// character; that partial character is dropped. Invalid UTF-8 anywhere else
/// makes the file malformed.
fn sample_text(buf: &[u8], truncated: bool) -> Result<&str, PreviewError> {
    match std::str::from_utf8(buf) {
        Ok(text) => Ok(text),
        Err(err) if truncated && err.error_len().is_none() => {
            Ok(std::str::from_utf8(&buf[..err.valid_up_to()]).unwrap_or_default())
        }
        Err(err) => {
            let valid = &buf[..err.valid_up_to()];
            let line = valid.iter().filter(|&&b| b == b'\n').count() as u64 + 1;
            Err(PreviewError::Malformed {
                line,
                message: format!("invalid utf-8 in sample: {err}"),
            })
        }
    }
}

/// Parse the header record and at most `max_lines` data records.
fn read_rows(
    file: File,
    path: &Path,
    delimiter: u8,
    max_lines: usize,
) -> Result<(Vec<String>, Vec<Vec<String>>), PreviewError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(file);
    let mut records = reader.records();

    let headers = match records.next() {
        None => return Ok((Vec::new(), Vec::new())),
        Some(record) => to_cells(record.map_err(|err| csv_error(path, err))?),
    };

    let mut rows = Vec::with_capacity(max_lines.min(64));
    for record in records.by_ref().take(max_lines) {
        rows.push(to_cells(record.map_err(|err| csv_error(path, err))?));
    }
    Ok((headers, rows))
}

fn to_cells(record: csv::StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

fn csv_error(path: &Path, err: csv::Error) -> PreviewError {
    let line = err.position().map_or(0, csv::Position::line);
    let message = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => PreviewError::io(path, source),
        _ => PreviewError::Malformed { line, message },
    }
}
