//! `ExternalMemory`: the four operations callers drive
//!
//! Holds only configuration; every call owns its files for its own duration
//! and nothing carries over between calls.

use std::path::Path;

use crate::config::SortConfig;
use crate::error::Result;
use crate::sort_merge::{
    self, JoinSummary, PipelineSummary, SelectSummary, SortSummary,
};

#[derive(Debug, Clone, Default)]
pub struct ExternalMemory {
    config: SortConfig,
}

impl ExternalMemory {
    pub fn new(config: SortConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Full-line lexicographic sort of `input` into `output`
    pub fn sort(&self, input: &Path, output: &Path, temp_dir: &Path) -> Result<SortSummary> {
        sort_merge::sort(input, output, temp_dir, &self.config)
    }

    /// Records whose key matches `substring`, in input order; no sort is applied
    pub fn select(&self, input: &Path, output: &Path, substring: &str, _temp_dir: &Path) -> Result<SelectSummary> {
        sort_merge::select(input, output, substring, &self.config)
    }

    /// Merge-join two inputs already sorted by key token
    pub fn join(&self, left: &Path, right: &Path, output: &Path, temp_dir: &Path) -> Result<JoinSummary> {
        sort_merge::join(left, right, output, temp_dir, &self.config)
    }

    /// Filter both unsorted inputs during their sorts, then join
    pub fn select_and_join(
        &self,
        left: &Path,
        right: &Path,
        output: &Path,
        substring: &str,
        temp_dir: &Path,
    ) -> Result<PipelineSummary> {
        sort_merge::select_and_join(left, right, output, substring, temp_dir, &self.config)
    }
}
