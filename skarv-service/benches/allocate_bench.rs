#[macro_use]
extern crate criterion;

use std::sync::Arc;

use criterion::Criterion;

use skarv_hal::DescriptorInfo;
use skarv_module::{make_api_version, registry};
use skarv_service::loader;
use skarv_sim::{SimConfig, SimModule};
use skarv_telemetry::AllocMetrics;

fn bench_allocate(c: &mut Criterion) {
    registry::install(Arc::new(SimModule::with_api_version(
        "bench.alloc",
        make_api_version(1, 0),
        SimConfig {
            capacity: 256,
            ..SimConfig::default()
        },
    )))
    .unwrap();
    let allocator = loader::load_module("bench.alloc", Arc::new(AllocMetrics::new())).unwrap();

    let mut group = c.benchmark_group("allocate_throughput");
    for count in [1u32, 4, 16] {
        group.throughput(criterion::Throughput::Elements(count as u64));
        group.bench_function(format!("count_{}", count), |b| {
            let descriptor = DescriptorInfo {
                width: 1024,
                height: 1,
                format: 1,
                layer_count: 1,
                usage: 0,
            }
            .encode();
            b.iter(|| {
                allocator.allocate(&descriptor, count, |result| {
                    assert!(result.is_ok());
                });
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_allocate);
criterion_main!(benches);
