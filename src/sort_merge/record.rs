//! Record model and line I/O
//!
//! A record is one line of text without its terminator. Fields are separated
//! by runs of ASCII whitespace. The key token is everything before the first
//! separator, shaped `<prefix><digits>` (e.g. `id42`); a record that starts
//! with whitespace has an empty key token. Ordering everywhere else in the
//! crate is over the whole line.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, IoContext, Result};

fn split_fields(line: &str) -> impl Iterator<Item = &str> {
    line.split(|c: char| c.is_ascii_whitespace())
}

/// Text before the first ASCII whitespace; empty when the record starts with whitespace
pub fn key_token(line: &str) -> &str {
    split_fields(line).next().unwrap_or("")
}

/// Fields after the key token
pub fn non_key_fields(line: &str) -> impl Iterator<Item = &str> {
    split_fields(line).skip(1).filter(|field| !field.is_empty())
}

/// Sequential reader of newline-delimited records
pub struct RecordReader<R = BufReader<File>> {
    inner: R,
    path: PathBuf,
    buf: String,
    line: u64,
}

impl RecordReader {
    pub fn open(path: &Path, capacity: usize) -> Result<Self> {
        let file = File::open(path).at(path)?;
        Ok(Self::from_reader(BufReader::with_capacity(capacity, file), path))
    }
}

impl<R: BufRead> RecordReader<R> {
    /// Wrap an arbitrary reader; `path` labels errors
    pub fn from_reader(inner: R, path: &Path) -> Self {
        Self {
            inner,
            path: path.to_path_buf(),
            buf: String::new(),
            line: 0,
        }
    }

    /// Next record with its terminator stripped, or `None` at EOF
    pub fn next_record(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let n = match self.inner.read_line(&mut self.buf) {
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                return Err(Error::NotUtf8 {
                    path: self.path.clone(),
                    line: self.line + 1,
                })
            }
            Err(e) => return Err(e).at(&self.path),
        };
        if n == 0 {
            return Ok(None);
        }
        if self.buf.ends_with('\n') {
            self.buf.pop();
            if self.buf.ends_with('\r') {
                self.buf.pop();
            }
        }
        self.line += 1;
        Ok(Some(std::mem::take(&mut self.buf)))
    }

    /// 1-based number of the record last returned
    pub fn line_number(&self) -> u64 {
        self.line
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Buffered writer of newline-terminated records
pub struct RecordWriter<W: Write = BufWriter<File>> {
    inner: W,
    path: PathBuf,
    written: u64,
}

impl RecordWriter {
    /// Create (or truncate) `path`
    pub fn create(path: &Path, capacity: usize) -> Result<Self> {
        let file = File::create(path).at(path)?;
        Ok(Self::from_writer(BufWriter::with_capacity(capacity, file), path))
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn from_writer(inner: W, path: &Path) -> Self {
        Self {
            inner,
            path: path.to_path_buf(),
            written: 0,
        }
    }

    pub fn write_record(&mut self, record: &str) -> Result<()> {
        self.inner.write_all(record.as_bytes()).at(&self.path)?;
        self.inner.write_all(b"\n").at(&self.path)?;
        self.written += 1;
        Ok(())
    }

    /// Flush and return the number of records written
    pub fn finish(mut self) -> Result<u64> {
        self.inner.flush().at(&self.path)?;
        Ok(self.written)
    }

    /// Flush and hand back the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.inner.flush().at(&self.path)?;
        Ok(self.inner)
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}
