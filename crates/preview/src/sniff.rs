//! Delimiter sniffing.
//!
//! The previewer only talks to the [`Sniffer`] trait, so the heuristic can be
//! replaced without touching row parsing. [`ConsistencySniffer`] is the
//! default: for every candidate it splits the sample into records with the
//! same quoting rules the row parser applies, counts the candidate outside
//! quotes in each record, and keeps the candidate whose modal count is
//! non-zero and shared by the largest share of records.
//!
//! Ambiguity is an error. If two candidates reach the same score the sniffer
//! refuses to pick one, because a wrong guess silently corrupts every row of
//! the preview.
use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::config::{PreviewConfig, DEFAULT_CANDIDATES};

const QUOTE: u8 = b'"';

/// A bounded prefix of a file's text.
#[derive(Debug, Clone, Copy)]
pub struct Sample<'a> {
    pub text: &'a str,
    /// The file continues past the end of `text`, so the last record may be cut.
    pub truncated: bool,
}

impl<'a> Sample<'a> {
    /// A sample that covers the whole file.
    pub fn complete(text: &'a str) -> Self {
        Self {
            text,
            truncated: false,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SniffError {
    #[error("the sample is empty")]
    EmptySample,

    #[error("no candidate delimiter repeats consistently across {records} sample record(s)")]
    NoConsistentDelimiter { records: usize },

    #[error("sample is ambiguous between {}", DisplayCandidates(.candidates))]
    Ambiguous { candidates: Vec<char> },
}

struct DisplayCandidates<'a>(&'a [char]);

impl fmt::Display for DisplayCandidates<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "{c:?}")?;
        }
        Ok(())
    }
}

/// Infers a field delimiter from a text sample.
pub trait Sniffer: Send + Sync {
    fn sniff(&self, sample: Sample<'_>) -> Result<u8, SniffError>;
}

/// Frequency + consistency heuristic over a fixed candidate set.
#[derive(Debug, Clone)]
pub struct ConsistencySniffer {
    candidates: Vec<u8>,
    min_consistency: f64,
}

impl Default for ConsistencySniffer {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_CANDIDATES.iter().map(|&c| c as u8).collect(),
            min_consistency: 0.9,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Score {
    /// Records whose count equals the mode.
    agreeing: usize,
    /// Modal per-record count.
    mode: usize,
}

impl ConsistencySniffer {
    /// Candidates must already be validated as ASCII (see `PreviewConfig::validate`).
    pub fn from_config(config: &PreviewConfig) -> Self {
        Self {
            candidates: config
                .candidates
                .iter()
                .filter(|c| c.is_ascii())
                .map(|&c| c as u8)
                .collect(),
            min_consistency: config.min_consistency,
        }
    }

    fn score(&self, counts: &[usize]) -> Option<Score> {
        if counts.is_empty() {
            return None;
        }
        let mut counts = counts.to_vec();
        counts.sort_unstable();

        // Most frequent count; the larger count wins a frequency tie.
        let mut best = Score { agreeing: 0, mode: 0 };
        for run in counts.chunk_by(|a, b| a == b) {
            let score = Score {
                agreeing: run.len(),
                mode: run[0],
            };
            if score >= best {
                best = score;
            }
        }

        let consistency = best.agreeing as f64 / counts.len() as f64;
        (best.mode > 0 && consistency >= self.min_consistency).then_some(best)
    }
}

impl Sniffer for ConsistencySniffer {
    fn sniff(&self, sample: Sample<'_>) -> Result<u8, SniffError> {
        if !sample.text.bytes().any(|b| !matches!(b, b'\n' | b'\r')) {
            return Err(SniffError::EmptySample);
        }

        let mut records = 0;
        let mut scored: Vec<(Score, u8)> = Vec::with_capacity(self.candidates.len());
        for &candidate in &self.candidates {
            let counts = record_counts(sample, candidate);
            records = records.max(counts.len());
            if let Some(score) = self.score(&counts) {
                scored.push((score, candidate));
            }
        }
        // Stable, so tied candidates keep their configured order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        debug!(records, ?scored, "sniff_scores");

        match scored.as_slice() {
            [] => Err(SniffError::NoConsistentDelimiter { records }),
            [(top, _), ..] => {
                let tied: Vec<char> = scored
                    .iter()
                    .take_while(|(score, _)| score == top)
                    .map(|&(_, c)| c as char)
                    .collect();
                if tied.len() > 1 {
                    return Err(SniffError::Ambiguous { candidates: tied });
                }
                Ok(tied[0] as u8)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    /// Nothing read yet in this field.
    Start,
    Unquoted,
    Quoted,
    /// A `"` inside a quoted field: either half of `""` or the closing quote.
    QuoteInQuoted,
}

/// Unquoted occurrences of `delimiter` in each non-blank record of the
/// sample, with `delimiter` taken as the field separator.
///
/// Quoting follows the row parser: `"` opens a quoted field only as the first
/// byte of a field, `""` inside quotes is a literal quote, and a `"` anywhere
/// else is plain text. `\r`, `\n` and `\r\n` end a record outside quotes. A
/// truncated sample loses its trailing partial record unless that record is
/// all there is.
fn record_counts(sample: Sample<'_>, delimiter: u8) -> Vec<usize> {
    let mut counts = Vec::new();
    let mut field = Field::Start;
    let mut count = 0;
    let mut record_len = 0;

    for &b in sample.text.as_bytes() {
        match (field, b) {
            (Field::Quoted, QUOTE) => field = Field::QuoteInQuoted,
            (Field::Quoted, _) => {}
            (Field::QuoteInQuoted, QUOTE) => field = Field::Quoted,
            (_, b'\n' | b'\r') => {
                if record_len > 0 {
                    counts.push(count);
                }
                count = 0;
                record_len = 0;
                field = Field::Start;
                continue;
            }
            (_, b) if b == delimiter => {
                count += 1;
                field = Field::Start;
            }
            (Field::Start, QUOTE) => field = Field::Quoted,
            _ => field = Field::Unquoted,
        }
        record_len += 1;
    }

    if record_len > 0 && (!sample.truncated || counts.is_empty()) {
        counts.push(count);
    }
    counts
}
