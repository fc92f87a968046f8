//! Benchmarks for layout save/apply.
//!
//! Run with: cargo bench -p chatui-layout

use chatui_harness::{MemoryHost, fixtures};
use chatui_layout::{BufferLayout, LayoutState, WindowLayout};
use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Fresh single-window screen holding the same buffers as `live`.
fn fresh_screen(live: &MemoryHost) -> MemoryHost {
    let mut host = MemoryHost::new();
    for name in live.buffer_names().into_iter().skip(1) {
        host.add_buffer("irc", name);
    }
    host
}

fn bench_window_save(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/window_save");

    for depth in [1, 3, 5, 7] {
        let host = fixtures::nested_splits(depth);
        group.bench_with_input(BenchmarkId::new("nested", depth), &host, |b, host| {
            let mut tree = WindowLayout::new();
            b.iter(|| black_box(tree.save(host)))
        });
    }

    group.finish();
}

fn bench_window_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/window_apply");

    for depth in [1, 3, 5, 7] {
        let live = fixtures::nested_splits(depth);
        let mut state = LayoutState::new();
        state.save_windows(&live);
        let fresh = fresh_screen(&live);

        group.bench_with_input(BenchmarkId::new("nested", depth), &state, |b, state| {
            b.iter_batched(
                || fresh.clone(),
                |mut host| black_box(state.apply_windows(&mut host)),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_buffer_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout/buffer_apply");

    for n in [10, 50, 200] {
        let mut host = MemoryHost::new();
        let names: Vec<String> = (0..n).map(|i| format!("#chan{i}")).collect();
        for name in &names {
            host.add_buffer("irc", name);
        }
        let mut layout = BufferLayout::new();
        layout.save(&host);

        let reversed: Vec<&str> = names.iter().rev().map(String::as_str).collect();
        host.reorder_buffers(&reversed);

        group.bench_with_input(BenchmarkId::new("reversed", n), &layout, |b, layout| {
            b.iter_batched(
                || host.clone(),
                |mut host| black_box(layout.apply(&mut host)),
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_dump(c: &mut Criterion) {
    let live = fixtures::nested_splits(5);
    let mut state = LayoutState::new();
    state.save_buffers(&live);
    state.save_windows(&live);

    c.bench_function("layout/dump", |b| b.iter(|| black_box(state.dump())));
}

criterion_group!(
    benches,
    bench_window_save,
    bench_window_apply,
    bench_buffer_apply,
    bench_dump,
);

criterion_main!(benches);
