//! Benchmarks for the frequency index operations.
//!
//! Run with: `cargo bench --bench freq_index`

use criterion::{BatchSize, Criterion, Throughput, criterion_group, criterion_main};
use lfukit::ds::FrequencyIndex;

/// Benchmark pop_min - removing the LFU candidate.
fn bench_pop_min(c: &mut Criterion) {
    let mut group = c.benchmark_group("freq_index");
    group.throughput(Throughput::Elements(1024));

    group.bench_function("pop_min", |b| {
        b.iter_batched(
            || {
                let mut freq = FrequencyIndex::with_capacity(1024);
                for i in 0..1024u64 {
                    freq.insert(i);
                }
                freq
            },
            |mut freq| {
                for _ in 0..1024u64 {
                    let _ = std::hint::black_box(freq.pop_min());
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

/// Benchmark touch - promoting keys through frequency tiers.
fn bench_touch(c: &mut Criterion) {
    let mut group = c.benchmark_group("freq_index");
    group.throughput(Throughput::Elements(4096));

    group.bench_function("touch", |b| {
        b.iter_batched(
            || {
                let mut freq = FrequencyIndex::with_capacity(4096);
                for i in 0..4096u64 {
                    freq.insert(i);
                }
                freq
            },
            |mut freq| {
                for i in 0..4096u64 {
                    let _ = std::hint::black_box(freq.touch(&std::hint::black_box(i)));
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

/// Benchmark insert at churn: fill, drain, refill reusing slots.
fn bench_insert_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("freq_index");
    group.throughput(Throughput::Elements(2048));

    group.bench_function("insert_churn", |b| {
        b.iter_batched(
            FrequencyIndex::<u64>::new,
            |mut freq| {
                for i in 0..1024u64 {
                    freq.insert(std::hint::black_box(i));
                }
                for _ in 0..512u64 {
                    let _ = freq.pop_min();
                }
                for i in 1024..2048u64 {
                    freq.insert(std::hint::black_box(i));
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_pop_min, bench_touch, bench_insert_churn);
criterion_main!(benches);
