//! Benchmarks for the BCD and binary field codecs.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench bcd_bench
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sas_protocol::bcd::{from_bcd, min_bcd_width, to_bcd, to_binary};
use std::hint::black_box;

/// Benchmark encoding meters at the widths the protocol uses.
fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("bcd_encode");
    group.throughput(Throughput::Elements(1));

    for width in [2usize, 4, 5, 8] {
        let value = 10u64.pow(2 * width as u32) - 1;
        group.bench_with_input(BenchmarkId::from_parameter(width), &width, |b, &width| {
            b.iter(|| to_bcd(black_box(value), width).unwrap());
        });
    }

    group.finish();
}

/// Benchmark decoding meters at the widths the protocol uses.
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("bcd_decode");
    group.throughput(Throughput::Elements(1));

    for width in [2usize, 4, 5, 8] {
        let encoded = to_bcd(10u64.pow(2 * width as u32) - 1, width).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(width), &encoded, |b, encoded| {
            b.iter(|| from_bcd(black_box(encoded)).unwrap());
        });
    }

    group.finish();
}

/// Benchmark the sized-meter path: width selection then encoding.
fn bench_sized(c: &mut Criterion) {
    c.bench_function("bcd_sized_meter", |b| {
        b.iter(|| {
            let value = black_box(1_234_567_890u64);
            to_bcd(value, min_bcd_width(value)).unwrap()
        });
    });

    c.bench_function("binary_amount", |b| {
        b.iter(|| to_binary(black_box(1_234_567_890u64), 5).unwrap());
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_sized);

criterion_main!(benches);
