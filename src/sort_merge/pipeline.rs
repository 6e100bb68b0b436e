//! Select, then sort each side, then join
//!
//! The key filter runs inside the Phase I scan of each sort, so runs, merges
//! and the join only ever see selected records. Neither input is ever
//! materialized in sorted form unfiltered.

use std::path::Path;
use std::time::Instant;

use tracing::info;

use super::external_sort::{sort_selected, SortSummary};
use super::merge_join::{join, JoinSummary};
use super::run::RunFiles;
use crate::config::SortConfig;
use crate::error::Result;

/// Name of the left side's filtered, sorted intermediate in the temp directory
pub const LEFT_INTERMEDIATE: &str = "sortSelected1.txt";
/// Name of the right side's filtered, sorted intermediate in the temp directory
pub const RIGHT_INTERMEDIATE: &str = "sortSelected2.txt";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub left: SortSummary,
    pub right: SortSummary,
    pub join: JoinSummary,
}

/// Join the records of `left` and `right` whose key matches `substring`
pub fn select_and_join(
    left: &Path,
    right: &Path,
    output: &Path,
    substring: &str,
    temp_dir: &Path,
    config: &SortConfig,
) -> Result<PipelineSummary> {
    let start_time = Instant::now();

    // removed on every exit path
    let mut intermediates = RunFiles::new();
    let left_sorted = intermediates.track(temp_dir.join(LEFT_INTERMEDIATE)).to_path_buf();
    let right_sorted = intermediates.track(temp_dir.join(RIGHT_INTERMEDIATE)).to_path_buf();

    let left_summary = sort_selected(left, &left_sorted, temp_dir, substring, config)?;
    let right_summary = sort_selected(right, &right_sorted, temp_dir, substring, config)?;
    let join_summary = join(&left_sorted, &right_sorted, output, temp_dir, config)?;
    drop(intermediates);

    info!(
        substring,
        left_kept = left_summary.records_kept,
        right_kept = right_summary.records_kept,
        joined = join_summary.joined,
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "select-and-join complete"
    );

    Ok(PipelineSummary {
        left: left_summary,
        right: right_summary,
        join: join_summary,
    })
}
