//! Microbenchmark isolating the relative matcher from all engine overhead
//! (I/O, threading, sorting), plus one end-to-end engine run.

use std::io::Write;
use std::sync::atomic::AtomicBool;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};

use relscan::prelude::*;

/// xorshift32 with a fixed seed: reproducible noise without pulling in a
/// randomness dependency.
fn generate_data(len: usize) -> Vec<u8> {
    let mut state = 0x2A2A_2A2Au32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

fn bench_matcher(c: &mut Criterion) {
    let data = generate_data(1 << 20);

    let mut group = c.benchmark_group("matcher");
    group.throughput(Throughput::Bytes(data.len() as u64));

    let simple = RelativeMatcher::<u8>::relative_str("abcde", 0, "").unwrap();
    group.bench_function("simple_8bit_1m", |b| b.iter(|| simple.search(&data)));

    let wildcard = RelativeMatcher::<u8>::relative_str("ab*de", '*' as u32, "").unwrap();
    group.bench_function("wildcard_8bit_1m", |b| b.iter(|| wildcard.search(&data)));

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let data = generate_data(4 << 20);
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&data).unwrap();
    file.flush().unwrap();

    let config = SearchConfigBuilder::default()
        .file_path(file.path())
        .keyword(code_points("abcde"))
        .preferred_search_block_size(524_288u32)
        .build()
        .unwrap();

    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("relative_8bit_4m", |b| {
        b.iter(|| {
            let abort = AtomicBool::new(false);
            let engine: SearchEngine<u8> = SearchEngine::new(config.clone());
            engine.run(|_, _| {}, &abort, false).unwrap()
        })
    });
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_matcher, bench_engine
);
criterion_main!(benches);
