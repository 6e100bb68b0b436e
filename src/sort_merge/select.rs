//! Key-token substring selection
//!
//! A record is selected when the decimal rendering of its key token's numeric
//! suffix contains the requested substring. `id0019` renders as `19`.

use std::path::Path;
use std::time::Instant;

use tracing::info;

use super::record::{key_token, RecordReader, RecordWriter};
use crate::config::SortConfig;
use crate::error::{Error, Result};

/// Counts reported by [`select`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectSummary {
    pub records_read: u64,
    pub records_kept: u64,
}

/// Predicate over key tokens shaped `<prefix><digits>`
#[derive(Debug, Clone)]
pub struct Selector<'a> {
    prefix: &'a str,
    substring: &'a str,
}

impl<'a> Selector<'a> {
    pub fn new(prefix: &'a str, substring: &'a str) -> Self {
        Self { prefix, substring }
    }

    /// Canonical decimal form of the key token's suffix, or `None` if the token is malformed
    pub fn normalized_suffix(&self, token: &str) -> Option<String> {
        let digits = token.strip_prefix(self.prefix)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse::<u64>().ok().map(|id| id.to_string())
    }

    /// Whether `record` passes; `Err` carries the malformed key token
    pub fn matches(&self, record: &str) -> std::result::Result<bool, String> {
        let token = key_token(record);
        match self.normalized_suffix(token) {
            Some(id) => Ok(id.contains(self.substring)),
            None => Err(token.to_string()),
        }
    }

    /// [`Selector::matches`] with the malformed-key error tagged by source location
    pub(crate) fn check(&self, record: &str, path: &Path, line: u64) -> Result<bool> {
        self.matches(record).map_err(|token| Error::MalformedKey {
            path: path.to_path_buf(),
            line,
            token,
        })
    }
}

/// Copy the records of `input` whose key matches `substring` to `output`, preserving input order
pub fn select(input: &Path, output: &Path, substring: &str, config: &SortConfig) -> Result<SelectSummary> {
    let start_time = Instant::now();
    let selector = Selector::new(&config.key_prefix, substring);

    let mut reader = RecordReader::open(input, config.io_buffer_bytes)?;
    let mut writer = RecordWriter::create(output, config.io_buffer_bytes)?;
    let mut summary = SelectSummary::default();

    while let Some(record) = reader.next_record()? {
        summary.records_read += 1;
        if selector.check(&record, reader.path(), reader.line_number())? {
            writer.write_record(&record)?;
        }
    }
    summary.records_kept = writer.finish()?;

    info!(
        input = %input.display(),
        output = %output.display(),
        read = summary.records_read,
        kept = summary.records_kept,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "select complete"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substring_nine_matches_all() {
        let selector = Selector::new("id", "9");
        for record in ["id9 a", "id19 b", "id91 c"] {
            assert_eq!(selector.matches(record), Ok(true), "{record}");
        }
    }

    #[test]
    fn test_substring_nineteen_matches_only_id19() {
        let selector = Selector::new("id", "19");
        assert_eq!(selector.matches("id9 a"), Ok(false));
        assert_eq!(selector.matches("id19 b"), Ok(true));
        assert_eq!(selector.matches("id91 c"), Ok(false));
    }

    #[test]
    fn test_leading_zeros_are_normalized() {
        let selector = Selector::new("id", "0");
        assert_eq!(selector.normalized_suffix("id0019").as_deref(), Some("19"));
        assert_eq!(selector.matches("id0019 x"), Ok(false));
        assert_eq!(selector.matches("id100 x"), Ok(true));
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let selector = Selector::new("id", "1");
        assert_eq!(selector.matches("xx1 a"), Err("xx1".to_string()));
        assert_eq!(selector.matches("id a"), Err("id".to_string()));
        assert_eq!(selector.matches("id1x a"), Err("id1x".to_string()));
        assert_eq!(selector.matches("id-1 a"), Err("id-1".to_string()));
        assert!(selector.matches("id99999999999999999999999 a").is_err());
        assert_eq!(selector.matches(""), Err(String::new()));
    }

    #[test]
    fn test_leading_whitespace_record_is_malformed() {
        let selector = Selector::new("id", "9");
        assert_eq!(selector.matches(" id9 b"), Err(String::new()));
        let err = selector.check(" id9 b", Path::new("left.txt"), 2).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MalformedRecord);
    }

    #[test]
    fn test_custom_prefix() {
        let selector = Selector::new("key", "4");
        assert_eq!(selector.matches("key42 v"), Ok(true));
        assert!(selector.matches("id42 v").is_err());
    }
}
