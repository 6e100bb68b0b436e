//! External sort, selection and merge-join over text records
//!
//! All operations are memory-bounded via streaming I/O; only the Phase I
//! batch of the external sort holds records in memory.
//!
//! ## Strategy
//!
//! 1. **Partition**: stream the input into bounded batches, sort each, spill as a run
//! 2. **Merge**: k-way merge every run into one sorted file
//! 3. **Join**: walk two key-sorted files in lockstep, pairing equal key tokens
//!
//! `select_and_join` pushes the key filter into step 1 of both sorts before joining.

pub mod external_sort;
pub mod kway;
pub mod merge_join;
pub mod pipeline;
pub mod record;
pub mod run;
pub mod select;

pub use external_sort::{sort, sort_selected, SortSummary};
pub use merge_join::{join, JoinSummary};
pub use pipeline::{select_and_join, PipelineSummary};
pub use select::{select, SelectSummary, Selector};
