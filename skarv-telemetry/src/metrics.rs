//! ## skarv-telemetry::metrics
//! **Prometheus counters and latency histogram for allocation traffic**
//!
//! One [`AllocMetrics`] is built at service start and shared with the
//! front end. Every allocation request ticks `skarv_allocations_total`;
//! failed ones additionally tick `skarv_allocation_failures_total`, so
//! the success count is the difference.

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct AllocMetrics {
    pub registry: Registry,
    pub allocations: Counter,
    pub allocation_failures: Counter,
    pub buffers_exported: Counter,
    pub allocation_latency: Histogram,
}

impl Default for AllocMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AllocMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let allocations =
            Counter::new("skarv_allocations_total", "Total allocation requests").unwrap();
        let allocation_failures = Counter::new(
            "skarv_allocation_failures_total",
            "Allocation requests that returned an error",
        )
        .unwrap();
        let buffers_exported = Counter::new(
            "skarv_buffers_exported_total",
            "Buffer handles delivered to callers",
        )
        .unwrap();

        let allocation_latency = Histogram::with_opts(
            HistogramOpts::new(
                "skarv_allocation_latency_ns",
                "Wall time of one serialized allocation call",
            )
            .buckets(vec![1_000.0, 10_000.0, 100_000.0, 1_000_000.0, 10_000_000.0]),
        )
        .unwrap();

        registry.register(Box::new(allocations.clone())).unwrap();
        registry
            .register(Box::new(allocation_failures.clone()))
            .unwrap();
        registry
            .register(Box::new(buffers_exported.clone()))
            .unwrap();
        registry
            .register(Box::new(allocation_latency.clone()))
            .unwrap();

        Self {
            registry,
            allocations,
            allocation_failures,
            buffers_exported,
            allocation_latency,
        }
    }

    pub fn gather(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap())
    }

    pub fn inc_allocations(&self) {
        self.allocations.inc();
    }

    pub fn inc_failures(&self) {
        self.allocation_failures.inc();
    }

    pub fn add_buffers_exported(&self, count: u64) {
        self.buffers_exported.inc_by(count as f64);
    }

    pub fn observe_latency_ns(&self, nanos: f64) {
        self.allocation_latency.observe(nanos);
    }
}
