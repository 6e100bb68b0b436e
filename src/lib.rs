//! extmem-query - external-memory query operations over text records
//!
//! Sort, select and equi-join newline-delimited records that do not fit in
//! memory, using a fixed memory budget and temporary run files on disk.

pub mod config;
pub mod engine;
pub mod error;
/// Tracing subscriber setup for binaries
pub mod logging;
pub mod sort_merge;

pub use config::{BatchStrategy, SortConfig};
pub use engine::ExternalMemory;
pub use error::{Error, ErrorKind, Result};
