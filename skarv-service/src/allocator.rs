//! ## skarv-service::allocator
//! **Mutex-serialized front end over the active allocation backend**
//!
//! One [`Allocator`] wraps the backend the loader picked and is the only
//! path to it. Allocation calls are serialized by a single mutex; the
//! debug dump deliberately is not.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, instrument, warn};

use skarv_hal::{AllocError, AllocatorHal, BufferBatch, BufferDescriptor, RawBufferHandle};
use skarv_telemetry::AllocMetrics;

/// The allocation front end.
///
/// Backend selection happened at load time and is never revisited; the
/// front end holds the chosen backend for the life of the process.
pub struct Allocator {
    hal: Box<dyn AllocatorHal>,
    lock: Mutex<()>,
    metrics: Arc<AllocMetrics>,
}

impl Allocator {
    pub fn new(hal: Box<dyn AllocatorHal>, metrics: Arc<AllocMetrics>) -> Self {
        Self {
            hal,
            lock: Mutex::new(()),
            metrics,
        }
    }

    /// Allocates `count` buffers for `descriptor` and hands the outcome to
    /// `deliver`, returning whatever `deliver` returns.
    ///
    /// On success the callback sees the batch while every buffer in it is
    /// still live on the device; the service releases its own raw handles
    /// only after the callback returns. On failure the callback sees the
    /// error and nothing is freed.
    ///
    /// The whole call, callback included, runs under the serialization
    /// lock. Calling back into this allocator from `deliver` deadlocks.
    #[instrument(skip_all, fields(count = count))]
    pub fn allocate<R>(
        &self,
        descriptor: &BufferDescriptor,
        count: u32,
        deliver: impl FnOnce(Result<BufferBatch, AllocError>) -> R,
    ) -> R {
        let started = Instant::now();
        let _serialized = self.lock.lock();
        self.metrics.inc_allocations();

        let outcome = match self.hal.allocate_buffers(descriptor, count) {
            Err(status) => {
                warn!(%status, "allocation failed");
                self.metrics.inc_failures();
                deliver(Err(status))
            }
            Ok(allocated) => {
                let produced = allocated.buffers.len() as u64;
                let batch = BufferBatch {
                    stride: allocated.stride,
                    buffers: allocated
                        .buffers
                        .iter()
                        .map(RawBufferHandle::export)
                        .collect(),
                };
                debug!(stride = batch.stride, buffers = produced, "allocation succeeded");
                let outcome = deliver(Ok(batch));
                self.hal.free_buffers(allocated.buffers);
                self.metrics.add_buffers_exported(produced);
                outcome
            }
        };

        self.metrics
            .observe_latency_ns(started.elapsed().as_nanos() as f64);
        outcome
    }

    /// Dumps backend state for diagnostics.
    ///
    /// Takes no lock: a dump may interleave with an in-flight allocation
    /// and read device state mid-call. Backends are expected to keep their
    /// dump output read-consistent without help from this lock.
    pub fn dump_debug_info(&self) -> String {
        self.hal.dump_debug_info()
    }
}
