//! Benchmarks for axis geometry: refresh, binary search, and band queries.
//!
//! Run with: cargo bench
//!
//! Results are saved to `target/criterion/` with HTML reports.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::cast_precision_loss
)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use domgrid::GridAxis;

fn varied_size(index: usize) -> f32 {
    ((index.wrapping_mul(2_654_435_761) >> 7) % 40 + 10) as f32
}

/// Axis construction (one full refresh) at increasing item counts.
fn bench_refresh(c: &mut Criterion) {
    let mut group = c.benchmark_group("axis_refresh");
    for items in [1_000usize, 10_000, 100_000] {
        group.throughput(Throughput::Elements(items as u64));
        group.bench_with_input(BenchmarkId::from_parameter(items), &items, |b, &items| {
            b.iter(|| GridAxis::new(black_box(items), 1.0, varied_size));
        });
    }
    group.finish();
}

/// Refresh cost with a third of the items hidden.
fn bench_refresh_with_hidden(c: &mut Criterion) {
    let hidden: std::collections::HashSet<usize> = (0..100_000).filter(|i| i % 3 == 0).collect();

    c.bench_function("axis_refresh_hidden_100k", |b| {
        let mut axis = GridAxis::new(100_000, 1.0, varied_size);
        axis.set_hidden(hidden.clone());
        b.iter(|| axis.refresh());
    });
}

/// Position lookup sweeping across the whole axis.
fn bench_search(c: &mut Criterion) {
    let axis = GridAxis::new(100_000, 1.0, varied_size);
    let total = axis.total_size();

    c.bench_function("axis_search_100k", |b| {
        let mut p = 0.0f32;
        b.iter(|| {
            p = (p + 977.0) % total;
            black_box(axis.search(black_box(p)))
        });
    });
}

/// Full band query the viewport resolver performs per scroll event.
fn bench_get_visible_items(c: &mut Criterion) {
    let axis = GridAxis::new(100_000, 1.0, varied_size);
    let total = axis.total_size();

    c.bench_function("axis_band_query_100k", |b| {
        let mut scroll = 0.0f32;
        b.iter(|| {
            scroll = (scroll + 613.0) % total;
            axis.get_visible_items(black_box(scroll - 200.0), 600.0, scroll, 200.0)
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_refresh,
    bench_refresh_with_hidden,
    bench_search,
    bench_get_visible_items
);
criterion_main!(benches);
