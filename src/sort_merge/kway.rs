//! K-way merge of sorted record streams
//!
//! A min-heap holds at most one entry per source. Entries order by full-line
//! text, then by source index so equal lines always come out in the same
//! order for the same inputs.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io::{BufRead, Write};

use super::record::{RecordReader, RecordWriter};
use crate::error::Result;

// Wrapper for heap ordering (min-heap by line, then source)
#[derive(Debug, Eq, PartialEq)]
struct HeapItem {
    line: String,
    source: usize,
}

impl Ord for HeapItem {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for min-heap
        other
            .line
            .cmp(&self.line)
            .then_with(|| other.source.cmp(&self.source))
    }
}

impl PartialOrd for HeapItem {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Merge already-sorted `sources` into `out`, returning the number of records written
///
/// Empty sources contribute nothing. Records from a single source keep their
/// relative order.
pub fn merge_sorted<R: BufRead, W: Write>(
    sources: &mut [RecordReader<R>],
    out: &mut RecordWriter<W>,
) -> Result<u64> {
    let mut heap = BinaryHeap::with_capacity(sources.len());

    for (source, reader) in sources.iter_mut().enumerate() {
        if let Some(line) = reader.next_record()? {
            heap.push(HeapItem { line, source });
        }
    }

    let mut merged = 0u64;
    while let Some(mut item) = heap.pop() {
        out.write_record(&item.line)?;
        merged += 1;

        if let Some(line) = sources[item.source].next_record()? {
            item.line = line;
            heap.push(item);
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::Path;

    fn reader(data: &'static str) -> RecordReader<Cursor<&'static str>> {
        RecordReader::from_reader(Cursor::new(data), Path::new("mem"))
    }

    fn merge(inputs: &[&'static str]) -> String {
        let mut sources: Vec<_> = inputs.iter().map(|d| reader(d)).collect();
        let mut out = RecordWriter::from_writer(Vec::new(), Path::new("mem"));
        merge_sorted(&mut sources, &mut out).unwrap();
        String::from_utf8(out.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_merges_three_runs() {
        let merged = merge(&["id1 a\nid4 d\n", "id2 b\nid5 e\n", "id3 c\n"]);
        assert_eq!(merged, "id1 a\nid2 b\nid3 c\nid4 d\nid5 e\n");
    }

    #[test]
    fn test_empty_sources_are_skipped() {
        let merged = merge(&["", "id1 a\n", ""]);
        assert_eq!(merged, "id1 a\n");
        assert_eq!(merge(&["", ""]), "");
    }

    #[test]
    fn test_duplicates_are_all_kept() {
        let merged = merge(&["id1 a\nid1 a\n", "id1 a\nid2 b\n"]);
        assert_eq!(merged, "id1 a\nid1 a\nid1 a\nid2 b\n");
    }

    #[test]
    fn test_heap_item_orders_by_line_then_source() {
        let mut heap = BinaryHeap::new();
        heap.push(HeapItem { line: "b".into(), source: 0 });
        heap.push(HeapItem { line: "a".into(), source: 2 });
        heap.push(HeapItem { line: "a".into(), source: 1 });
        let order: Vec<(String, usize)> =
            std::iter::from_fn(|| heap.pop().map(|i| (i.line, i.source))).collect();
        assert_eq!(
            order,
            vec![("a".to_string(), 1), ("a".to_string(), 2), ("b".to_string(), 0)]
        );
    }
}
