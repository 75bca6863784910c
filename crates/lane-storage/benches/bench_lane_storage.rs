use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lane_core::{CandidateMemory, Category};
use lane_storage::{is_contained_duplicate, MemoryStore};
use tempfile::TempDir;

fn seeded(tmp: &TempDir, n: usize) -> MemoryStore {
    let store = MemoryStore::new(tmp.path().join("memories.json"));
    let candidates: Vec<CandidateMemory> = (0..n)
        .map(|i| {
            let category = Category::ALL[i % Category::ALL.len()];
            CandidateMemory::new(
                format!("Memory {i} records how module {i} handles retries and timeouts."),
                category,
                0.5 + (i % 5) as f64 / 10.0,
                "bench",
            )
        })
        .collect();
    store.ingest(&candidates).unwrap();
    store
}

fn bench_markdown(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    let store = seeded(&tmp, 400);
    c.bench_function("to_markdown_400", |b| {
        b.iter(|| black_box(store.to_markdown(None).unwrap()))
    });
}

fn bench_add(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    let store = seeded(&tmp, 100);
    c.bench_function("add_memory_100", |b| {
        b.iter(|| {
            store
                .add_memory(Category::Context, "bench note", "bench", 0.7, HashMap::new())
                .unwrap()
        })
    });
}

fn bench_containment(c: &mut Criterion) {
    let a = "Use the repository pattern for all database access in this project";
    let b = "We decided: use the repository pattern for all database access in this project.";
    c.bench_function("containment_check", |bench| {
        bench.iter(|| black_box(is_contained_duplicate(black_box(a), black_box(b))))
    });
}

criterion_group!(benches, bench_markdown, bench_add, bench_containment);
criterion_main!(benches);
