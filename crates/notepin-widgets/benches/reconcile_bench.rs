//! Benchmark: reconciliation passes over lists of varying length.
//!
//! Run with: `cargo bench -p notepin-widgets --bench reconcile_bench`
//!
//! Covers the three paths a session hits most: a single toggle (targeted
//! update), an insertion in the middle (interleave), and a swap (full
//! repack).

use std::hint::black_box;

use chrono::NaiveDate;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use notepin_core::{Item, ItemId};
use notepin_widgets::{Reconciler, StackView};

fn items(len: u64) -> Vec<Item> {
    let stamp = NaiveDate::from_ymd_opt(2025, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default();
    (1..=len)
        .map(|id| Item::new(ItemId::new(id), stamp).with_text(format!("item {id}")))
        .collect()
}

fn primed(list: &[Item]) -> (Reconciler, StackView) {
    let mut rec = Reconciler::new();
    let mut view = StackView::new();
    rec.reconcile(list, 13, false, &mut view);
    (rec, view)
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for len in [10u64, 100, 1_000] {
        let base = items(len);
        let mid = base.len() / 2;

        let mut toggled = base.clone();
        toggled[mid].completed = true;
        group.bench_with_input(BenchmarkId::new("toggle", len), &toggled, |b, next| {
            b.iter_batched(
                || primed(&base),
                |(mut rec, mut view)| black_box(rec.reconcile(next, 13, false, &mut view)),
                criterion::BatchSize::SmallInput,
            );
        });

        let mut inserted = base.clone();
        let stamp = base[0].created_at();
        inserted.insert(mid, Item::new(ItemId::new(len + 1), stamp));
        group.bench_with_input(BenchmarkId::new("insert", len), &inserted, |b, next| {
            b.iter_batched(
                || primed(&base),
                |(mut rec, mut view)| black_box(rec.reconcile(next, 13, false, &mut view)),
                criterion::BatchSize::SmallInput,
            );
        });

        let mut swapped = base.clone();
        swapped.swap(mid - 1, mid);
        group.bench_with_input(BenchmarkId::new("swap", len), &swapped, |b, next| {
            b.iter_batched(
                || primed(&base),
                |(mut rec, mut view)| black_box(rec.reconcile(next, 13, false, &mut view)),
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

criterion_group!(benches, bench_reconcile);
criterion_main!(benches);
