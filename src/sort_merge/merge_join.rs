//! Merge-join of two files sorted by key token
//!
//! Both inputs must already be sorted so that key tokens appear in
//! non-decreasing text order. Keys compare as raw text, never numerically.
//!
//! Output: for each matching pair, the left record followed by the right
//! record's non-key fields, separated by single spaces.
//!
//! ## Duplicate keys on the left
//!
//! The join makes one pass with a single cursor per side. When the keys are
//! equal, the current left record is paired with every consecutive right
//! record sharing that key and the right cursor moves past the group. A
//! second left record with the same key therefore finds the right cursor
//! already beyond its group and joins against nothing from it. Given
//!
//! ```text
//! left:  id1 a | id1 a2 | id2 b
//! right: id1 x | id1 x2 | id2 y
//! ```
//!
//! the output is `id1 a x`, `id1 a x2`, `id2 b y` (three rows, not five).
//! This cardinality is part of the contract; callers with duplicate left
//! keys get the reduced result.

use std::io::BufRead;
use std::path::Path;
use std::time::Instant;

use tracing::info;

use super::record::{key_token, non_key_fields, RecordReader, RecordWriter};
use crate::config::SortConfig;
use crate::error::Result;

/// Counts reported by [`join`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinSummary {
    /// Left records consumed before the join finished
    pub left_records: u64,
    /// Right records consumed before the join finished
    pub right_records: u64,
    /// Rows written
    pub joined: u64,
}

/// One side of the join: the current record and its reader
struct JoinCursor<R> {
    reader: RecordReader<R>,
    current: Option<String>,
    consumed: u64,
}

impl<R: BufRead> JoinCursor<R> {
    fn new(mut reader: RecordReader<R>) -> Result<Self> {
        let current = reader.next_record()?;
        let consumed = u64::from(current.is_some());
        Ok(Self {
            reader,
            current,
            consumed,
        })
    }

    fn key(&self) -> Option<&str> {
        self.current.as_deref().map(key_token)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = self.reader.next_record()?;
        if self.current.is_some() {
            self.consumed += 1;
        }
        Ok(())
    }
}

/// Left record followed by the right record's non-key fields
pub fn combine_records(left: &str, right: &str) -> String {
    let mut joined = String::with_capacity(left.len() + right.len());
    joined.push_str(left);
    for field in non_key_fields(right) {
        joined.push(' ');
        joined.push_str(field);
    }
    joined
}

/// Join two key-sorted files into `output`
///
/// `temp_dir` is unused: the join streams both inputs once.
pub fn join(
    left: &Path,
    right: &Path,
    output: &Path,
    _temp_dir: &Path,
    config: &SortConfig,
) -> Result<JoinSummary> {
    let start_time = Instant::now();

    let left_reader = RecordReader::open(left, config.io_buffer_bytes)?;
    let right_reader = RecordReader::open(right, config.io_buffer_bytes)?;
    let mut writer = RecordWriter::create(output, config.io_buffer_bytes)?;

    let summary = merge_join(left_reader, right_reader, &mut writer)?;
    writer.finish()?;

    info!(
        left = %left.display(),
        right = %right.display(),
        output = %output.display(),
        joined = summary.joined,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "join complete"
    );
    Ok(summary)
}

/// Merge-join loop over arbitrary record streams
pub fn merge_join<L, R, W>(
    left: RecordReader<L>,
    right: RecordReader<R>,
    out: &mut RecordWriter<W>,
) -> Result<JoinSummary>
where
    L: BufRead,
    R: BufRead,
    W: std::io::Write,
{
    let mut left = JoinCursor::new(left)?;
    let mut right = JoinCursor::new(right)?;
    let mut joined = 0u64;

    loop {
        let (Some(left_key), Some(right_key)) = (left.key(), right.key()) else {
            break;
        };

        match left_key.cmp(right_key) {
            std::cmp::Ordering::Greater => right.advance()?,
            std::cmp::Ordering::Less => left.advance()?,
            std::cmp::Ordering::Equal => {
                // Pair the current left record with the whole right group
                if let Some(left_line) = left.current.as_deref() {
                    let key = key_token(left_line);
                    while let Some(right_line) = right.current.as_deref() {
                        if key_token(right_line) != key {
                            break;
                        }
                        out.write_record(&combine_records(left_line, right_line))?;
                        joined += 1;
                        right.advance()?;
                    }
                }
                left.advance()?;
            }
        }
    }

    Ok(JoinSummary {
        left_records: left.consumed,
        right_records: right.consumed,
        joined,
    })
}
