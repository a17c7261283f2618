//! Benchmarks for long poll dispatch through the standard registry.
//!
//! Run benchmarks with:
//! ```sh
//! cargo bench --bench parser_bench
//! ```

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use sas_core::SasClientConfig;
use sas_protocol::{
    ParserRegistry, SasHandlers,
    parsers::{ControlRequest, GameConfiguration, MeterRequest, MeterResponse},
};
use std::hint::black_box;
use std::sync::Arc;

fn registry() -> ParserRegistry {
    let handlers = SasHandlers {
        control: Some(Arc::new(|_: ControlRequest| Some(true))),
        meters: Some(Arc::new(|request: MeterRequest| {
            Some(
                request
                    .meters
                    .iter()
                    .fold(MeterResponse::new(), |response, meter| {
                        response.with(*meter, 12_345_678)
                    }),
            )
        })),
        machine_id: Some(Arc::new(|()| {
            Some(GameConfiguration {
                game_id: "AB".to_string(),
                additional_id: "001".to_string(),
                paytable_id: "PT0042".to_string(),
                base_percentage: "9350".to_string(),
                ..GameConfiguration::default()
            })
        })),
        ..SasHandlers::default()
    };
    ParserRegistry::standard(&SasClientConfig::default(), handlers).unwrap()
}

/// Benchmark single polls of increasing reply size.
fn bench_dispatch(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let polls: [(&str, &[u8]); 5] = [
        ("control_ack", &[0x01, 0x01]),
        ("single_meter", &[0x01, 0x11]),
        ("meter_group", &[0x01, 0x1C]),
        ("machine_id", &[0x01, 0x1F]),
        ("unhandled_nack", &[0x01, 0xEE]),
    ];
    for (name, frame) in polls {
        group.bench_function(name, |b| {
            b.iter(|| black_box(registry.process(black_box(frame))));
        });
    }

    group.finish();
}

/// Benchmark the extended meter poll and the multi-denomination preamble.
fn bench_multi_meter(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("multi_meter");
    group.throughput(Throughput::Elements(1));

    let extended = [0x01, 0x6F, 0x08, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x02, 0x00];
    group.bench_function("extended_meters", |b| {
        b.iter(|| black_box(registry.process(black_box(&extended))));
    });

    let preamble = [0x01, 0xB0, 0x02, 0x04, 0x11];
    group.bench_function("preamble_single_meter", |b| {
        b.iter(|| black_box(registry.process(black_box(&preamble))));
    });

    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_multi_meter);

criterion_main!(benches);
