//! Error taxonomy for the external-memory operations
//!
//! Input that is not valid UTF-8 is a record-level failure
//! ([`Error::NotUtf8`]), not an I/O one.
//!
//! Every failure aborts the operation that raised it. Partial output files
//! left behind by a failed call must be treated as invalid.

use std::io;
use std::path::{Path, PathBuf};

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], for callers that branch on the kind of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or unwritable paths, disk exhaustion, read failures
    Io,
    /// Malformed key token, undecodable line, or an input with no records to estimate from
    MalformedRecord,
    /// Rejected configuration
    Config,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed key token {token:?} at {}:{line}", .path.display())]
    MalformedKey {
        path: PathBuf,
        line: u64,
        token: String,
    },

    #[error("record at {}:{line} is not valid UTF-8", .path.display())]
    NotUtf8 { path: PathBuf, line: u64 },

    #[error("input {} has no records", .path.display())]
    EmptyInput { path: PathBuf },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::MalformedKey { .. } | Error::NotUtf8 { .. } | Error::EmptyInput { .. } => {
                ErrorKind::MalformedRecord
            }
            Error::Config { .. } => ErrorKind::Config,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }
}

/// Attach the offending path to a raw `io::Result`
pub(crate) trait IoContext<T> {
    fn at(self, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for io::Result<T> {
    fn at(self, path: &Path) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
