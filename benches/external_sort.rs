//! External sort and select-join benchmarks
//! Small memory budgets force many runs so the k-way merge dominates

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use extmem_query::{ExternalMemory, SortConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

fn write_random_records(path: &std::path::Path, seed: u64, count: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut text = String::with_capacity(count * 24);
    for _ in 0..count {
        let id: u32 = rng.gen_range(0..count as u32);
        let value: u32 = rng.gen();
        text.push_str(&format!("id{} v{} payload\n", id, value));
    }
    std::fs::write(path, text).unwrap();
}

fn benchmark_external_sort(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.txt");
    let output = dir.path().join("out.txt");
    let tmp = dir.path().join("tmp");
    write_random_records(&input, 42, 50_000);

    let mut group = c.benchmark_group("external_sort");
    for budget in [64 * 1024usize, 1024 * 1024, 30_000_000] {
        let engine = ExternalMemory::new(SortConfig::default().with_memory_budget(budget)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(budget), &budget, |b, _| {
            b.iter(|| {
                let summary = engine.sort(&input, &output, &tmp).unwrap();
                black_box(summary);
            })
        });
    }
    group.finish();
}

fn benchmark_select_and_join(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let left = dir.path().join("left.txt");
    let right = dir.path().join("right.txt");
    let output = dir.path().join("out.txt");
    let tmp = dir.path().join("tmp");
    write_random_records(&left, 1, 50_000);
    write_random_records(&right, 2, 50_000);
    let engine = ExternalMemory::new(SortConfig::default().with_memory_budget(256 * 1024)).unwrap();

    c.bench_function("select_and_join", |b| {
        b.iter(|| {
            let summary = engine
                .select_and_join(&left, &right, &output, black_box("7"), &tmp)
                .unwrap();
            black_box(summary);
        })
    });
}

criterion_group!(benches, benchmark_external_sort, benchmark_select_and_join);
criterion_main!(benches);
