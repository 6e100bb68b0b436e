//! Property tests for the external sort

use std::path::Path;

use extmem_query::{ExternalMemory, SortConfig};
use proptest::prelude::*;
use tempfile::TempDir;

fn record() -> impl Strategy<Value = String> {
    (0u32..200, "[a-z]{0,6}").prop_map(|(id, word)| format!("id{id} {word}"))
}

fn write(path: &Path, records: &[String]) {
    let mut text = String::new();
    for r in records {
        text.push_str(r);
        text.push('\n');
    }
    std::fs::write(path, text).unwrap();
}

fn sorted_with(budget: usize, input: &Path, dir: &Path, name: &str) -> Vec<u8> {
    let engine = ExternalMemory::new(SortConfig::default().with_memory_budget(budget)).unwrap();
    let output = dir.join(name);
    engine.sort(input, &output, &dir.join("tmp")).unwrap();
    std::fs::read(output).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_sort_is_sorted_permutation(records in prop::collection::vec(record(), 1..300), budget in 64usize..2_000) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.txt");
        write(&input, &records);

        let out = sorted_with(budget, &input, dir.path(), "out.txt");

        let mut expected = records.clone();
        expected.sort();
        let actual: Vec<String> = String::from_utf8(out).unwrap().lines().map(str::to_string).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_budget_does_not_change_output(records in prop::collection::vec(record(), 1..200), a in 64usize..500, b in 500usize..100_000) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.txt");
        write(&input, &records);

        prop_assert_eq!(
            sorted_with(a, &input, dir.path(), "a.txt"),
            sorted_with(b, &input, dir.path(), "b.txt")
        );
    }

    #[test]
    fn prop_sort_is_idempotent(records in prop::collection::vec(record(), 1..200), budget in 64usize..1_000) {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.txt");
        write(&input, &records);

        let once = sorted_with(budget, &input, dir.path(), "once.txt");
        let twice = sorted_with(budget, &dir.path().join("once.txt"), dir.path(), "twice.txt");
        prop_assert_eq!(once, twice);
    }
}
