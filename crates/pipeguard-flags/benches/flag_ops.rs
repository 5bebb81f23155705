//! Micro-benchmarks for the flag set hot paths.

use criterion::{Criterion, criterion_group, criterion_main};
use pipeguard_flags::{FlagSet, StatusFlags};
use std::hint::black_box;

fn bench_set(c: &mut Criterion) {
    let flags = FlagSet::new();
    c.bench_function("set_producer_ok", |b| {
        b.iter(|| flags.set(black_box(StatusFlags::PRODUCER_OK)));
    });
}

fn bench_poll(c: &mut Criterion) {
    let flags = FlagSet::new();
    c.bench_function("set_then_poll_clear", |b| {
        b.iter(|| {
            flags.set(StatusFlags::CONSUMER_OK | StatusFlags::PRODUCER_OK);
            black_box(flags.poll_any(black_box(StatusFlags::all()), true))
        });
    });

    c.bench_function("poll_empty", |b| {
        b.iter(|| black_box(flags.poll_any(StatusFlags::ESCALATION, false)));
    });
}

criterion_group!(benches, bench_set, bench_poll);
criterion_main!(benches);
