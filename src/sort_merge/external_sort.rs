//! Two-phase external merge sort
//!
//! Phase I streams the input into bounded in-memory batches, sorting each one
//! into a run file (`tmp0`, `tmp1`, ...). Phase II k-way merges every run into
//! the output. An optional key-substring filter is applied during the Phase I
//! scan, so dropped records never reach a run.
//!
//! ## Memory bound
//!
//! With [`BatchStrategy::FirstRecordEstimate`] the batch holds at most
//! `budget / (2 × len(first record))` records for the whole call. The estimate
//! is never revised, so longer records later in the input can push real usage
//! past the budget. [`BatchStrategy::ByteBudget`] counts every kept record
//! instead.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use super::kway::merge_sorted;
use super::record::{RecordReader, RecordWriter};
use super::run::{run_path, sort_and_write_run, RunFiles};
use super::select::Selector;
use crate::config::{BatchStrategy, SortConfig};
use crate::error::{Error, IoContext, Result};

/// Counts reported by a sort
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortSummary {
    /// Records scanned from the input
    pub records_read: u64,
    /// Records that passed the filter (all of them when unfiltered)
    pub records_kept: u64,
    /// Run files written in Phase I
    pub runs: usize,
    /// Records written to the final output
    pub records_written: u64,
    /// Largest batch held in memory at once
    pub max_batch_records: usize,
}

/// Estimated in-memory cost of one record: two bytes per input byte
pub fn estimated_record_bytes(record: &str) -> usize {
    record.len().max(1) * 2
}

/// Fixed Phase I batch bound derived from the first record
pub fn max_batch_records(memory_budget: usize, first_record: &str) -> usize {
    (memory_budget / estimated_record_bytes(first_record)).max(1)
}

/// Sort `input` into `output` by full-line order, spilling runs to `temp_dir`
pub fn sort(input: &Path, output: &Path, temp_dir: &Path, config: &SortConfig) -> Result<SortSummary> {
    two_phase_sort(input, output, temp_dir, None, config)
}

/// Sort only the records whose key token matches `substring`
pub fn sort_selected(
    input: &Path,
    output: &Path,
    temp_dir: &Path,
    substring: &str,
    config: &SortConfig,
) -> Result<SortSummary> {
    let selector = Selector::new(&config.key_prefix, substring);
    two_phase_sort(input, output, temp_dir, Some(&selector), config)
}

/// Phase I batch plus the runs it has spilled so far
struct RunBuilder<'a> {
    temp_dir: &'a Path,
    io_buffer: usize,
    strategy: BatchStrategy,
    memory_budget: usize,
    max_records: usize,
    batch: Vec<String>,
    batch_bytes: usize,
    max_batch_seen: usize,
    runs: RunFiles,
}

impl<'a> RunBuilder<'a> {
    fn new(temp_dir: &'a Path, config: &SortConfig, max_records: usize) -> Self {
        Self {
            temp_dir,
            io_buffer: config.io_buffer_bytes,
            strategy: config.batch_strategy,
            memory_budget: config.memory_budget_bytes,
            max_records,
            // capacity grows on demand; a huge budget must not pre-allocate
            batch: Vec::with_capacity(max_records.min(64 * 1024)),
            batch_bytes: 0,
            max_batch_seen: 0,
            runs: RunFiles::new(),
        }
    }

    fn push(&mut self, record: String) -> Result<()> {
        let cost = estimated_record_bytes(&record);
        if self.strategy == BatchStrategy::ByteBudget
            && !self.batch.is_empty()
            && self.batch_bytes + cost > self.memory_budget
        {
            self.spill()?;
        }

        self.batch_bytes += cost;
        self.batch.push(record);
        self.max_batch_seen = self.max_batch_seen.max(self.batch.len());

        if self.strategy == BatchStrategy::FirstRecordEstimate && self.batch.len() >= self.max_records {
            self.spill()?;
        }
        Ok(())
    }

    /// Write the current batch as the next run and start an empty one
    fn spill(&mut self) -> Result<()> {
        let path = run_path(self.temp_dir, self.runs.len());
        // tracked before creation so a failed write is still cleaned up
        let path = self.runs.track(path);
        sort_and_write_run(&mut self.batch, path, self.io_buffer)?;
        self.batch.clear();
        self.batch_bytes = 0;
        Ok(())
    }

    /// Flush the final partial batch; at least one run always exists afterwards
    fn finish(mut self) -> Result<(RunFiles, usize)> {
        if !self.batch.is_empty() || self.runs.is_empty() {
            self.spill()?;
        }
        Ok((std::mem::take(&mut self.runs), self.max_batch_seen))
    }
}

fn two_phase_sort(
    input: &Path,
    output: &Path,
    temp_dir: &Path,
    selector: Option<&Selector<'_>>,
    config: &SortConfig,
) -> Result<SortSummary> {
    config.validate()?;
    let start_time = Instant::now();
    std::fs::create_dir_all(temp_dir).at(temp_dir)?;

    // Phase I: partition into sorted runs
    let mut reader = RecordReader::open(input, config.io_buffer_bytes)?;
    let first = reader.next_record()?.ok_or_else(|| Error::EmptyInput {
        path: input.to_path_buf(),
    })?;
    let max_records = max_batch_records(config.memory_budget_bytes, &first);
    debug!(
        input = %input.display(),
        first_record_bytes = first.len(),
        max_batch_records = max_records,
        strategy = ?config.batch_strategy,
        "estimated batch size"
    );

    let mut builder = RunBuilder::new(temp_dir, config, max_records);
    let mut summary = SortSummary::default();
    let mut next = Some(first);

    while let Some(record) = next {
        summary.records_read += 1;
        let keep = match selector {
            Some(selector) => selector.check(&record, reader.path(), reader.line_number())?,
            None => true,
        };
        if keep {
            summary.records_kept += 1;
            builder.push(record)?;
        }
        next = reader.next_record()?;
    }
    drop(reader);

    let (runs, max_batch_seen) = builder.finish()?;
    summary.runs = runs.len();
    summary.max_batch_records = max_batch_seen;
    info!(
        input = %input.display(),
        read = summary.records_read,
        kept = summary.records_kept,
        runs = summary.runs,
        "phase I complete"
    );

    // Phase II: k-way merge of all runs
    let mut sources = runs
        .paths()
        .iter()
        .map(|path| RecordReader::open(path, config.io_buffer_bytes))
        .collect::<Result<Vec<_>>>()?;
    let mut writer = RecordWriter::create(output, config.io_buffer_bytes)?;
    merge_sorted(&mut sources, &mut writer)?;
    summary.records_written = writer.finish()?;
    drop(sources);
    drop(runs);

    info!(
        output = %output.display(),
        records = summary.records_written,
        runs = summary.runs,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "phase II complete"
    );
    Ok(summary)
}
