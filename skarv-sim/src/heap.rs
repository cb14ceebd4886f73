//! Shared state behind the simulated devices.
//!
//! One [`SimState`] is shared between a [`SimModule`](crate::SimModule) and
//! every device it opens, so tests and the CLI can observe what the service
//! did to the module after the fact: which tokens were freed, whether any
//! two serialized device calls ever overlapped, how many double-frees were
//! attempted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::warn;

use skarv_hal::RawBufferHandle;
use skarv_module::DeviceError;

use crate::SimConfig;

#[derive(Debug, Clone, Copy)]
pub(crate) struct BufferRecord {
    pub stride: u32,
}

/// The token table proper, guarded by one mutex.
pub(crate) struct SimHeap {
    next_token: u64,
    live: HashMap<u64, BufferRecord>,
    freed: Vec<u64>,
    fail_next: bool,
    double_frees: u64,
    config: SimConfig,
}

impl SimHeap {
    fn new(config: SimConfig) -> Self {
        Self {
            next_token: 0,
            live: HashMap::new(),
            freed: Vec::new(),
            fail_next: false,
            double_frees: 0,
            config,
        }
    }

    pub(crate) fn allocate_one(&mut self, width: u32) -> Result<(RawBufferHandle, u32), DeviceError> {
        if self.fail_next {
            self.fail_next = false;
            return Err(DeviceError::Failure("injected fault".into()));
        }
        if self.live.len() >= self.config.capacity {
            return Err(DeviceError::Exhausted);
        }
        let stride = width
            .checked_mul(BYTES_PER_TEXEL)
            .and_then(|bytes| align_up(bytes, self.config.stride_align))
            .ok_or(DeviceError::BadParameter("width too large"))?;
        self.next_token += 1;
        self.live.insert(self.next_token, BufferRecord { stride });
        Ok((RawBufferHandle::new(self.next_token), stride))
    }

    pub(crate) fn free_one(&mut self, handle: RawBufferHandle) {
        let token = handle.token();
        if self.live.remove(&token).is_some() {
            self.freed.push(token);
        } else {
            self.double_frees += 1;
            warn!(token, "free of a token that is not live");
        }
    }

    pub(crate) fn stride_of(&self, handle: &RawBufferHandle) -> Result<u32, DeviceError> {
        self.live
            .get(&handle.token())
            .map(|record| record.stride)
            .ok_or(DeviceError::BadParameter("handle not live"))
    }

    pub(crate) fn live_len(&self) -> usize {
        self.live.len()
    }

    pub(crate) fn freed(&self) -> &[u64] {
        &self.freed
    }

    pub(crate) fn double_frees(&self) -> u64 {
        self.double_frees
    }

    pub(crate) fn arm_fault(&mut self) {
        self.fail_next = true;
    }

    pub(crate) fn config(&self) -> &SimConfig {
        &self.config
    }
}

/// Simulated texel size; the sim assigns no meaning to format codes and
/// prices every buffer at four bytes per texel.
const BYTES_PER_TEXEL: u32 = 4;

fn align_up(value: u32, align: u32) -> Option<u32> {
    debug_assert!(align.is_power_of_two());
    value.checked_add(align - 1).map(|padded| padded & !(align - 1))
}

/// Heap plus the overlap detector the serialization tests observe.
///
/// The entry/exit counter sits outside the heap mutex: the mutex would
/// serialize device calls by itself and hide any overlap the front end
/// failed to prevent. Only allocate/free traffic is tracked; the debug
/// dump path is unsynchronized at the front end and must not trip the
/// detector.
pub struct SimState {
    pub(crate) heap: Mutex<SimHeap>,
    active_calls: AtomicU32,
    overlaps: AtomicU64,
    alloc_calls: AtomicU64,
}

impl SimState {
    pub(crate) fn new(config: SimConfig) -> Self {
        Self {
            heap: Mutex::new(SimHeap::new(config)),
            active_calls: AtomicU32::new(0),
            overlaps: AtomicU64::new(0),
            alloc_calls: AtomicU64::new(0),
        }
    }

    /// Marks entry into a serialized device call; the guard marks the exit.
    pub(crate) fn begin_call(&self) -> CallGuard<'_> {
        if self.active_calls.fetch_add(1, Ordering::SeqCst) > 0 {
            self.overlaps.fetch_add(1, Ordering::SeqCst);
        }
        // Widen the race window so an unserialized front end gets caught.
        std::thread::yield_now();
        CallGuard { state: self }
    }

    pub(crate) fn note_alloc_call(&self) {
        self.alloc_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn overlap_count(&self) -> u64 {
        self.overlaps.load(Ordering::SeqCst)
    }

    pub fn alloc_calls(&self) -> u64 {
        self.alloc_calls.load(Ordering::Relaxed)
    }
}

pub(crate) struct CallGuard<'a> {
    state: &'a SimState,
}

impl Drop for CallGuard<'_> {
    fn drop(&mut self) {
        self.state.active_calls.fetch_sub(1, Ordering::SeqCst);
    }
}
