//! Phase I run sorter and run-file lifetime
//!
//! A run is one in-memory batch, sorted by full-line order and written to
//! `tmp<k>` in the temp directory. Runs are consumed once by the k-way merge.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::record::RecordWriter;
use crate::error::Result;

/// Path of run `index` inside `temp_dir`
pub fn run_path(temp_dir: &Path, index: usize) -> PathBuf {
    temp_dir.join(format!("tmp{}", index))
}

/// Sort `batch` in memory and write it as a new run file
///
/// The batch is left sorted; callers clear it before reuse.
pub fn sort_and_write_run(batch: &mut [String], path: &Path, io_buffer: usize) -> Result<u64> {
    batch.sort_unstable();

    let mut writer = RecordWriter::create(path, io_buffer)?;
    for record in batch.iter() {
        writer.write_record(record)?;
    }
    let written = writer.finish()?;

    debug!(run = %path.display(), records = written, "wrote sorted run");
    Ok(written)
}

/// Owns temporary files and removes them when dropped
///
/// Removal is best-effort and runs on every exit path, so a failed sort
/// does not leave its runs behind.
#[derive(Debug, Default)]
pub struct RunFiles {
    paths: Vec<PathBuf>,
}

impl RunFiles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track `path`; it is removed when the guard drops
    pub fn track(&mut self, path: PathBuf) -> &Path {
        self.paths.push(path);
        &self.paths[self.paths.len() - 1]
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Drop for RunFiles {
    fn drop(&mut self) {
        for path in &self.paths {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove temp file"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_is_sorted_by_full_line() {
        let dir = TempDir::new().unwrap();
        let path = run_path(dir.path(), 0);
        let mut batch = vec![
            "id2 b".to_string(),
            "id10 z".to_string(),
            "id1 z".to_string(),
            "id1 a".to_string(),
        ];

        let written = sort_and_write_run(&mut batch, &path, 1024).unwrap();

        assert_eq!(written, 4);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "id1 a\nid1 z\nid10 z\nid2 b\n");
    }

    #[test]
    fn test_same_batch_gives_identical_bytes() {
        let dir = TempDir::new().unwrap();
        let records = vec!["id3 c".to_string(), "id1 a".to_string(), "id2 b".to_string()];

        sort_and_write_run(&mut records.clone(), &run_path(dir.path(), 0), 1024).unwrap();
        sort_and_write_run(&mut records.clone(), &run_path(dir.path(), 1), 1024).unwrap();

        assert_eq!(
            std::fs::read(run_path(dir.path(), 0)).unwrap(),
            std::fs::read(run_path(dir.path(), 1)).unwrap()
        );
    }

    #[test]
    fn test_run_files_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = run_path(dir.path(), 7);
        assert!(path.ends_with("tmp7"));
        {
            let mut runs = RunFiles::new();
            let tracked = runs.track(path.clone());
            std::fs::write(tracked, "id1 a\n").unwrap();
            // never created: dropping must not complain
            runs.track(run_path(dir.path(), 8));
            assert_eq!(runs.len(), 2);
        }
        assert!(!path.exists());
    }
}
